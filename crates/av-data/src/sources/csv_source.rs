use std::path::PathBuf;
use std::fs::File;
use std::io::{BufReader, Read};
use async_trait::async_trait;
use csv::{ReaderBuilder, StringRecord};
use tracing::{info, warn};
use av_core::data::{RawStationRow, StationSource};
use crate::DataError;
use crate::config::{ColumnMapping, DashboardConfig, NullConfig};

/// CSV data source for station availability rows
pub struct CsvStationSource {
    /// Path to the CSV file
    path: PathBuf,
    /// Header names to read
    columns: ColumnMapping,
    /// Which values count as missing
    null_config: NullConfig,
    /// Source name
    source_name: String,
}

/// Positions of the mapped columns within a header row
struct ColumnIndices {
    station_id: usize,
    station_name: usize,
    latitude: usize,
    longitude: usize,
    time_of_day: usize,
    operational_status: usize,
    bike_availability: usize,
    dock_availability: usize,
}

impl ColumnIndices {
    fn resolve(headers: &StringRecord, columns: &ColumnMapping) -> Result<Self, DataError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim() == name)
                .ok_or_else(|| DataError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            station_id: find(&columns.station_id)?,
            station_name: find(&columns.station_name)?,
            latitude: find(&columns.latitude)?,
            longitude: find(&columns.longitude)?,
            time_of_day: find(&columns.time_of_day)?,
            operational_status: find(&columns.operational_status)?,
            bike_availability: find(&columns.bike_availability)?,
            dock_availability: find(&columns.dock_availability)?,
        })
    }
}

/// Outcome of reading one CSV record
enum ParsedRow {
    Row(RawStationRow),
    /// A required value was missing; holds the column name
    Missing(String),
}

impl CsvStationSource {
    /// Create a new CSV source
    pub fn new(path: PathBuf, columns: ColumnMapping, null_config: NullConfig) -> Self {
        let source_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown.csv")
            .to_string();

        Self {
            path,
            columns,
            null_config,
            source_name,
        }
    }

    /// Create a source from the dashboard configuration
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(
            config.data_path.clone(),
            config.columns.clone(),
            config.null_config.clone(),
        )
    }

    /// Read every row from any CSV reader
    ///
    /// Rows with a missing required value are skipped with a warning; a
    /// present value that does not parse is an error.
    pub fn read_rows<R: Read>(
        reader: R,
        columns: &ColumnMapping,
        null_config: &NullConfig,
    ) -> Result<Vec<RawStationRow>, DataError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let indices = ColumnIndices::resolve(&headers, columns)?;

        let mut rows = Vec::new();
        let mut skipped = 0usize;

        for result in csv_reader.records() {
            let record = result?;
            match Self::parse_record(&record, &indices, columns, null_config)? {
                ParsedRow::Row(row) => rows.push(row),
                ParsedRow::Missing(column) => {
                    skipped += 1;
                    warn!("Skipping line {}: missing value for '{}'", line_of(&record), column);
                }
            }
        }

        if skipped > 0 {
            warn!("Skipped {} rows with missing values", skipped);
        }

        Ok(rows)
    }

    fn parse_record(
        record: &StringRecord,
        indices: &ColumnIndices,
        columns: &ColumnMapping,
        null_config: &NullConfig,
    ) -> Result<ParsedRow, DataError> {
        macro_rules! text {
            ($field:ident) => {
                match record
                    .get(indices.$field)
                    .and_then(|value| null_config.present(value))
                {
                    Some(value) => value,
                    None => return Ok(ParsedRow::Missing(columns.$field.clone())),
                }
            };
        }

        macro_rules! number {
            ($field:ident) => {{
                let value = text!($field);
                value.parse::<f64>().map_err(|_| DataError::InvalidValue {
                    line: line_of(record),
                    column: columns.$field.clone(),
                    value: value.to_string(),
                })?
            }};
        }

        Ok(ParsedRow::Row(RawStationRow {
            station_id: text!(station_id).to_string(),
            station_name: text!(station_name).to_string(),
            latitude: number!(latitude),
            longitude: number!(longitude),
            time_of_day: text!(time_of_day).to_string(),
            operational_status: text!(operational_status).to_string(),
            bike_availability: number!(bike_availability),
            dock_availability: number!(dock_availability),
        }))
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

#[async_trait]
impl StationSource for CsvStationSource {
    async fn load_rows(&self) -> anyhow::Result<Vec<RawStationRow>> {
        info!("Reading station availability from {:?}", self.path);

        let path = self.path.clone();
        let columns = self.columns.clone();
        let null_config = self.null_config.clone();

        let rows = tokio::task::spawn_blocking(move || -> Result<Vec<RawStationRow>, DataError> {
            let file = File::open(&path)?;
            Self::read_rows(BufReader::new(file), &columns, &null_config)
        })
        .await
        .map_err(DataError::from)??;

        info!("Read {} rows from {}", rows.len(), self.source_name);
        Ok(rows)
    }

    fn source_name(&self) -> &str {
        &self.source_name
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
id,stationName,latitude,longitude,time_of_day,statusValue,bike_uptime,dock_uptime
72,W 52 St & 11 Ave,40.76727216,-73.99392888,Peak Weekday Mornings (7-10 AM),In Service,0.9,0.35
79,Franklin St & W Broadway,40.71911552,-74.00666661,Peak Weekday Mornings (7-10 AM),In Service,0.3,0.95
82,St James Pl & Pearl St,40.71117416,-74.00016545,Other,In Service,0.5,0.5
83,Atlantic Ave & Fort Greene Pl,40.68382604,-73.97632328,Peak Weekday Evenings (5-8 PM),Not In Service,0.1,0.2
";

    fn read(csv: &str) -> Result<Vec<RawStationRow>, DataError> {
        CsvStationSource::read_rows(csv.as_bytes(), &ColumnMapping::default(), &NullConfig::default())
    }

    #[test]
    fn test_reads_all_rows_with_default_mapping() {
        let rows = read(SAMPLE).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].station_id, "72");
        assert_eq!(rows[0].station_name, "W 52 St & 11 Ave");
        assert_eq!(rows[0].bike_availability, 0.9);
        assert_eq!(rows[1].dock_availability, 0.95);
        assert_eq!(rows[3].operational_status, "Not In Service");
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let csv = "id,stationName,latitude\n1,A,40.0\n";
        assert!(matches!(read(csv), Err(DataError::MissingColumn(c)) if c == "longitude"));
    }

    #[test]
    fn test_rows_with_missing_values_are_skipped() {
        let csv = "\
id,stationName,latitude,longitude,time_of_day,statusValue,bike_uptime,dock_uptime
1,A,40.0,-74.0,Morning,In Service,N/A,0.5
2,B,40.1,-74.1,Morning,In Service,0.4,0.5
";
        let rows = read(csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].station_name, "B");
    }

    #[test]
    fn test_unparseable_number_is_an_error() {
        let csv = "\
id,stationName,latitude,longitude,time_of_day,statusValue,bike_uptime,dock_uptime
1,A,forty,-74.0,Morning,In Service,0.5,0.5
";
        match read(csv) {
            Err(DataError::InvalidValue { column, value, line }) => {
                assert_eq!(column, "latitude");
                assert_eq!(value, "forty");
                assert_eq!(line, 2);
            }
            other => panic!("expected invalid value, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_column_mapping() {
        let csv = "stationId,name,lat,lng,bucket,status,bikes,docks\n9,Z,40.0,-74.0,Morning,In Service,0.1,0.2\n";
        let columns = ColumnMapping {
            station_id: "stationId".to_string(),
            station_name: "name".to_string(),
            latitude: "lat".to_string(),
            longitude: "lng".to_string(),
            time_of_day: "bucket".to_string(),
            operational_status: "status".to_string(),
            bike_availability: "bikes".to_string(),
            dock_availability: "docks".to_string(),
        };
        let rows = CsvStationSource::read_rows(csv.as_bytes(), &columns, &NullConfig::default()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].station_id, "9");
        assert_eq!(rows[0].time_of_day, "Morning");
    }

    #[tokio::test]
    async fn test_missing_file_fails_to_load() {
        let source = CsvStationSource::new(
            PathBuf::from("does/not/exist.csv"),
            ColumnMapping::default(),
            NullConfig::default(),
        );
        assert_eq!(source.source_name(), "exist.csv");
        assert!(source.load_rows().await.is_err());
    }

    #[tokio::test]
    async fn test_load_rows_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file.flush().unwrap();

        let source = CsvStationSource::new(
            file.path().to_path_buf(),
            ColumnMapping::default(),
            NullConfig::default(),
        );
        let rows = source.load_rows().await.unwrap();
        assert_eq!(rows, read(SAMPLE).unwrap());
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].station_name, "Franklin St & W Broadway");
    }

    #[test]
    fn test_sample_feeds_dataset_retention() {
        let dataset = crate::Dataset::load(read(SAMPLE).unwrap());
        assert_eq!(dataset.len(), 2);
        let buckets = dataset.distinct_time_of_day_buckets();
        assert_eq!(buckets.len(), 1);
        assert!(buckets.contains("Peak Weekday Mornings (7-10 AM)"));
    }
}

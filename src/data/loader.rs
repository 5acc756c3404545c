use crate::data::price::PriceRecord;
use crate::data::source::SourceError;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRecord {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    adj_close: f64,
    volume: f64,
    #[serde(default)]
    dividend: f64,
    #[serde(default)]
    split_factor: Option<f64>,
}

//loads daily price records from a csv file
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<PriceRecord>, SourceError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    read_csv(file).map_err(|e| match e {
        SourceError::Parse(msg) => SourceError::Parse(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

//parses daily price records from any csv reader
//expected header: date,open,high,low,close,adj_close,volume,dividend[,split_factor]
pub fn read_csv<R: Read>(input: R) -> Result<Vec<PriceRecord>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let mut records = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let line = index + 2;
        let row: CsvRecord = result
            .map_err(|e| SourceError::Parse(format!("bad csv record at line {}: {}", line, e)))?;

        let date = parse_iso_date(&row.date).ok_or_else(|| {
            SourceError::Parse(format!("bad date '{}' at line {}", row.date, line))
        })?;

        let record = PriceRecord::new(
            date,
            row.open,
            row.high,
            row.low,
            row.close,
            row.adj_close,
            row.volume,
            row.dividend,
        )?
        .with_split_factor(row.split_factor.unwrap_or(1.0));

        records.push(record);
    }

    Ok(records)
}

//accepts plain dates and provider timestamps such as 2024-01-10T00:00:00.000Z
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let day = text.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

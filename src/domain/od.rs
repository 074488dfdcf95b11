//! Parsing of origin/destination trip counts.

use super::errors::{DomainError, DomainResult};
use super::models::OdPair;
use tracing::warn;

/// Parses `from,to,count` rows into OD pairs.
///
/// The first line is a header and is always skipped. Rows that don't have
/// exactly three fields are ignored, as are rows whose count isn't a
/// non-negative integer (those are logged).
///
/// # Errors
///
/// Returns [`DomainError::InvalidOdData`] if the text can't be read as CSV at all.
///
/// # Examples
///
/// ```
/// use mapstack::domain::parse_od;
///
/// let pairs = parse_od("from,to,count\nS01,S02,12\n").unwrap();
/// assert_eq!(pairs.len(), 1);
/// assert_eq!(pairs[0].count, 12);
/// ```
pub fn parse_od(raw: &str) -> DomainResult<Vec<OdPair>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut od = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DomainError::InvalidOdData(e.to_string()))?;
        if record.len() != 3 {
            continue;
        }
        match record[2].trim().parse::<u32>() {
            Ok(count) => od.push(OdPair {
                from: record[0].to_string(),
                to: record[1].to_string(),
                count,
            }),
            Err(e) => {
                warn!(row = line + 1, value = &record[2], "skipping OD row with bad count: {}", e);
            }
        }
    }
    Ok(od)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_od_skips_header() {
        let od = parse_od("zone1,zone2,count\nA,B,3\nB,C,10").unwrap();
        assert_eq!(
            od,
            vec![
                OdPair { from: "A".to_string(), to: "B".to_string(), count: 3 },
                OdPair { from: "B".to_string(), to: "C".to_string(), count: 10 },
            ]
        );
    }

    #[test]
    fn test_parse_od_ignores_rows_with_wrong_arity() {
        let od = parse_od("h1,h2,h3\nA,B\nA,B,1,extra\nC,D,4\n\n").unwrap();
        assert_eq!(od.len(), 1);
        assert_eq!(od[0].from, "C");
        assert_eq!(od[0].count, 4);
    }

    #[test]
    fn test_parse_od_skips_bad_counts() {
        let od = parse_od("h1,h2,h3\nA,B,lots\nA,B,-2\nA,C, 7 \n").unwrap();
        assert_eq!(od.len(), 1);
        assert_eq!(od[0].to, "C");
        assert_eq!(od[0].count, 7);
    }

    #[test]
    fn test_parse_od_empty_input() {
        assert!(parse_od("").unwrap().is_empty());
        assert!(parse_od("only,a,header\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_od_quoted_zone_names() {
        let od = parse_od("from,to,count\n\"Leith, North\",Portobello,2\n").unwrap();
        assert_eq!(od[0].from, "Leith, North");
        assert_eq!(od[0].to, "Portobello");
    }
}

use chrono::{NaiveDate, NaiveTime};
use crate::session::SessionError;
/// Parts of a rig block name, `experiment-YYMMDD-HHMMSS_ID-YYMMDD-HHMMSS[suffix]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockName {
    pub experiment: String,
    pub version_date: String,
    pub version_time: String,
    pub identifier: String,
    pub start_date: String,
    pub start_time: String,
    /// Trailing text with underscores stripped; empty when absent.
    pub suffix: String,
}
impl BlockName {
    /// Splits a block name at the first place where both stamped halves line up.
    pub fn parse(name: &str) -> Result<Self, SessionError> {
        for (head, _) in name.match_indices('-').filter(|(i, _)| *i > 0) {
            let Some((version_date, version_time)) = stamp(&name[head..]) else {
                continue;
            };
            let rest = &name[head + STAMP_LEN..];
            let Some(rest) = rest.strip_prefix('_') else {
                continue;
            };
            for (tail, _) in rest.match_indices('-').filter(|(i, _)| *i > 0) {
                if let Some((start_date, start_time)) = stamp(&rest[tail..]) {
                    return Ok(Self {
                        experiment: name[..head].to_string(),
                        version_date: version_date.to_string(),
                        version_time: version_time.to_string(),
                        identifier: rest[..tail].to_string(),
                        start_date: start_date.to_string(),
                        start_time: start_time.to_string(),
                        suffix: rest[tail + STAMP_LEN..].replace('_', ""),
                    });
                }
            }
        }
        Err(SessionError::InvalidName(format!(
            "`{name}` does not look like experiment-YYMMDD-HHMMSS_ID-YYMMDD-HHMMSS"
        )))
    }
    /// `YYMMDDTHHMMSS` of the experiment template version.
    pub fn experiment_version(&self) -> String {
        format!("{}T{}", self.version_date, self.version_time)
    }
    pub fn bids_name(&self) -> Result<String, SessionError> {
        let suffix = (!self.suffix.is_empty()).then_some(self.suffix.as_str());
        bids_name(&self.identifier, &self.start_date, Some(&self.start_time), suffix)
    }
}
/// Length of `-DDDDDD-DDDDDD`.
const STAMP_LEN: usize = 14;
/// Matches `-DDDDDD-DDDDDD` at the start of `s`.
fn stamp(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    if bytes.len() < STAMP_LEN || bytes[0] != b'-' || bytes[7] != b'-' {
        return None;
    }
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    if digits(1..7) && digits(8..14) {
        Some((&s[1..7], &s[8..14]))
    } else {
        None
    }
}
/// Formats `sub-ID_ses-DATE[THHMMSS][_desc-SUFFIX]`.
///
/// `date` is `YYMMDD` or `YYYYMMDD`, `time` is `HHMMSS`; both must name a real calendar
/// date / clock time.
pub fn bids_name(
    identifier: &str,
    date: &str,
    time: Option<&str>,
    suffix: Option<&str>,
) -> Result<String, SessionError> {
    if identifier.is_empty() || identifier.contains(|c: char| c == '_' || c == '-') {
        return Err(SessionError::InvalidName(format!(
            "subject identifier `{identifier}` must be non-empty without `_` or `-`"
        )));
    }
    parse_date(date)?;
    let mut name = format!("sub-{identifier}_ses-{date}");
    if let Some(time) = time {
        parse_time(time)?;
        name.push('T');
        name.push_str(time);
    }
    if let Some(suffix) = suffix {
        name.push_str("_desc-");
        name.push_str(suffix);
    }
    Ok(name)
}
fn numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
fn field(s: &str, range: std::ops::Range<usize>) -> u32 {
    s[range].parse().unwrap_or(u32::MAX)
}
/// `YYMMDD` (years 2000-2069 and 1970-1999) or `YYYYMMDD`.
pub fn parse_date(date: &str) -> Result<NaiveDate, SessionError> {
    let invalid = || SessionError::InvalidName(format!("`{date}` is not a YYMMDD or YYYYMMDD date"));
    if !numeric(date) {
        return Err(invalid());
    }
    let (year, rest) = match date.len() {
        8 => (field(date, 0..4) as i32, 4),
        6 => {
            let yy = field(date, 0..2) as i32;
            (if yy < 70 { 2000 + yy } else { 1900 + yy }, 2)
        }
        _ => return Err(invalid()),
    };
    NaiveDate::from_ymd_opt(year, field(date, rest..rest + 2), field(date, rest + 2..rest + 4))
        .ok_or_else(invalid)
}
pub fn parse_time(time: &str) -> Result<NaiveTime, SessionError> {
    let invalid = || SessionError::InvalidName(format!("`{time}` is not an HHMMSS time"));
    if time.len() != 6 || !numeric(time) {
        return Err(invalid());
    }
    NaiveTime::from_hms_opt(field(time, 0..2), field(time, 2..4), field(time, 4..6)).ok_or_else(invalid)
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn parses_a_plain_block_name() {
        let block = BlockName::parse("OpenField-230104-101530_M12-230217-093005").unwrap();
        assert_eq!(block.experiment, "OpenField");
        assert_eq!(block.experiment_version(), "230104T101530");
        assert_eq!(block.identifier, "M12");
        assert_eq!(block.start_date, "230217");
        assert_eq!(block.start_time, "093005");
        assert_eq!(block.suffix, "");
        assert_eq!(block.bids_name().unwrap(), "sub-M12_ses-230217T093005");
    }
    #[test]
    fn hyphenated_experiments_and_suffixes_survive() {
        let block = BlockName::parse("fear-cond-day2-220901-120000_A7-220915-154500_cam_1").unwrap();
        assert_eq!(block.experiment, "fear-cond-day2");
        assert_eq!(block.identifier, "A7");
        assert_eq!(block.suffix, "cam1");
        assert_eq!(
            block.bids_name().unwrap(),
            "sub-A7_ses-220915T154500_desc-cam1"
        );
    }
    #[test]
    fn malformed_block_names_are_rejected() {
        for name in [
            "",
            "no-stamps-here",
            "exp-230104-101530-M12-230217-093005",
            "-230104-101530_M12-230217-093005",
            "exp-2301a4-101530_M12-230217-093005",
        ] {
            assert!(
                matches!(BlockName::parse(name), Err(SessionError::InvalidName(_))),
                "{name} should not parse"
            );
        }
    }
    #[test]
    fn bids_names_cover_every_optional_part() {
        assert_eq!(bids_name("M1", "20230217", None, None).unwrap(), "sub-M1_ses-20230217");
        assert_eq!(
            bids_name("M1", "230217", Some("235959"), None).unwrap(),
            "sub-M1_ses-230217T235959"
        );
        assert_eq!(
            bids_name("M1", "230217", Some("000000"), Some("zdff")).unwrap(),
            "sub-M1_ses-230217T000000_desc-zdff"
        );
        assert_eq!(
            bids_name("M1", "230217", None, Some("zdff")).unwrap(),
            "sub-M1_ses-230217_desc-zdff"
        );
    }
    #[test]
    fn impossible_dates_and_times_are_rejected() {
        for date in ["230230", "2023021", "20231301", "23-02-1", "230229"] {
            assert!(bids_name("M1", date, None, None).is_err(), "{date}");
        }
        assert!(bids_name("M1", "240229", None, None).is_ok());
        for time in ["246000", "12345", "1234567", "ab0000", "236000"] {
            assert!(bids_name("M1", "230217", Some(time), None).is_err(), "{time}");
        }
        assert!(bids_name("", "230217", None, None).is_err());
        assert!(bids_name("M_1", "230217", None, None).is_err());
    }
}

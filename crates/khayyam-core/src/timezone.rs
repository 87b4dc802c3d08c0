use std::str::FromStr;

use chrono_tz::Tz;

use crate::error::{CoreError, Result};

/// Parse an IANA timezone name.
pub fn parse_timezone(timezone: &str) -> Result<Tz> {
    Tz::from_str(timezone).map_err(|_| CoreError::InvalidTimezone(timezone.to_string()))
}

/// Validate an IANA timezone name without keeping the parsed zone.
pub fn validate_timezone(timezone: &str) -> Result<()> {
    parse_timezone(timezone).map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_timezone() {
        assert!(validate_timezone("UTC").is_ok());
        assert!(validate_timezone("Asia/Tehran").is_ok());
        assert!(validate_timezone("America/New_York").is_ok());
        assert!(validate_timezone("Invalid/Timezone").is_err());
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Asia/Tehran").unwrap(), chrono_tz::Asia::Tehran);
        assert!(matches!(
            parse_timezone("Not/AZone"),
            Err(CoreError::InvalidTimezone(_))
        ));
    }
}

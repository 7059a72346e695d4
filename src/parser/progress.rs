// Fixed two-line progress reply:
//   SD printing byte <completed>/<total>
//   Layer: <current>/<total>
use super::ParseError;
use crate::models::{ByteProgress, LayerProgress, PrinterProgress};

const LAYER_LABEL: &str = "Layer:";

pub fn parse(payload: &str) -> Result<PrinterProgress, ParseError> {
    let lines: Vec<&str> = payload.lines().collect();
    if lines.len() < 2 {
        return Err(ParseError::MissingLine {
            expected: 2,
            found: lines.len(),
        });
    }

    let byte_line = lines[0].trim();
    // Drop the descriptive prefix, whatever the firmware calls it. Signs stay
    // so a negative count is rejected rather than silently made positive.
    let counts = byte_line.trim_start_matches(|c: char| !c.is_ascii_digit() && c != '-' && c != '+');
    let (completed_bytes, total_bytes) = fraction(counts, byte_line)?;

    let layer_line = lines[1].trim();
    let counts = layer_line
        .strip_prefix(LAYER_LABEL)
        .ok_or_else(|| ParseError::MissingLabel {
            label: LAYER_LABEL,
            line: layer_line.to_string(),
        })?;
    let (current_layer, total_layers) = fraction(counts, layer_line)?;

    Ok(PrinterProgress {
        bytes: ByteProgress::new(completed_bytes, total_bytes),
        layer: LayerProgress::new(current_layer, total_layers),
    })
}

fn fraction(counts: &str, line: &str) -> Result<(u64, u64), ParseError> {
    let (done, total) = counts
        .split_once('/')
        .ok_or_else(|| ParseError::MissingSeparator {
            line: line.to_string(),
        })?;
    Ok((count(done)?, count(total)?))
}

fn count(text: &str) -> Result<u64, ParseError> {
    let text = text.trim();
    text.parse().map_err(|_| ParseError::NotNumeric {
        value: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_reply() {
        let progress = parse("SD printing byte 12345/54321\r\nLayer: 12/200\r").unwrap();
        assert_eq!(progress.bytes.completed_bytes, 12345);
        assert_eq!(progress.bytes.total_bytes, 54321);
        assert_eq!(progress.bytes.percentage, 22.73);
        assert_eq!(progress.layer.current_layer, 12);
        assert_eq!(progress.layer.total_layers, 200);
        assert_eq!(progress.layer.percentage, 6.0);
    }

    #[test]
    fn test_idle_printer_reports_zero() {
        let progress = parse("SD printing byte 0/0\nLayer: 0/0").unwrap();
        assert_eq!(progress.bytes.percentage, 0.0);
        assert_eq!(progress.layer.percentage, 0.0);

        let progress = parse("SD printing byte 100/0\nLayer: 5/0").unwrap();
        assert_eq!(progress.bytes.percentage, 0.0);
        assert_eq!(progress.layer.percentage, 0.0);
    }

    #[test]
    fn test_whitespace_around_counts() {
        let progress = parse("  SD printing byte  7 / 14 \nLayer:3 /  4").unwrap();
        assert_eq!(progress.bytes.percentage, 50.0);
        assert_eq!(progress.layer.percentage, 75.0);
    }

    #[test]
    fn test_single_line_is_missing_line() {
        assert_eq!(
            parse("SD printing byte 1/2"),
            Err(ParseError::MissingLine { expected: 2, found: 1 })
        );
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(
            parse("SD printing byte 12\nLayer: 1/2"),
            Err(ParseError::MissingSeparator { .. })
        ));
        assert!(matches!(
            parse("SD printing byte 1/2\nLayer 1/2"),
            Err(ParseError::MissingLabel { label: "Layer:", .. })
        ));
        assert_eq!(
            parse("SD printing byte 1/lots\nLayer: 1/2"),
            Err(ParseError::NotNumeric { value: "lots".to_string() })
        );
        assert_eq!(
            parse("SD printing byte 1/2\nLayer: -1/2"),
            Err(ParseError::NotNumeric { value: "-1".to_string() })
        );
        assert_eq!(
            parse("SD printing byte -5/10\nLayer: 1/2"),
            Err(ParseError::NotNumeric { value: "-5".to_string() })
        );
        assert_eq!(
            parse("SD printing byte 5/-10\nLayer: 1/2"),
            Err(ParseError::NotNumeric { value: "-10".to_string() })
        );
    }
}

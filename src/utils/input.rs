use std::io::{self, BufRead, Write};

use crate::data::compass::CompassDirection;

/// Prompts until the line is blank (`None`) or parses as a number.
pub fn get_input<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> io::Result<Option<f64>> {
    loop {
        write!(output, "{}", prompt)?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        match trimmed.parse() {
            Ok(num) => return Ok(Some(num)),
            Err(_) => writeln!(output, "Please enter a valid number")?,
        }
    }
}

/// Lists the compass points and prompts until one is picked by number, label
/// or abbreviation. A blank line leaves the direction unset.
pub fn get_direction<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Option<CompassDirection>> {
    writeln!(output, "Most frequent wind direction:")?;
    for direction in CompassDirection::ALL {
        writeln!(output, "  {}. {}", direction.code(), direction.label())?;
    }
    loop {
        write!(output, "Direction: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let picked = match trimmed.parse::<u8>() {
            Ok(code) => CompassDirection::from_code(code),
            Err(_) => trimmed.parse().ok(),
        };
        match picked {
            Some(direction) => return Ok(Some(direction)),
            None => writeln!(output, "Pick one of the listed directions")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reprompts_until_number() {
        let mut input = Cursor::new("abc\n21.5\n");
        let mut output = Vec::new();
        let value = get_input(&mut input, &mut output, "Tn: ").unwrap();
        assert_eq!(value, Some(21.5));
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Tn: ").count(), 2);
        assert!(shown.contains("Please enter a valid number"));
    }

    #[test]
    fn test_blank_line_and_eof_mean_unset() {
        let mut output = Vec::new();
        assert_eq!(get_input(&mut Cursor::new("\n"), &mut output, "x: ").unwrap(), None);
        assert_eq!(get_input(&mut Cursor::new(""), &mut output, "x: ").unwrap(), None);
    }

    #[test]
    fn test_direction_by_number_or_label() {
        let mut output = Vec::new();
        assert_eq!(
            get_direction(&mut Cursor::new("3\n"), &mut output).unwrap(),
            Some(CompassDirection::East)
        );
        assert_eq!(
            get_direction(&mut Cursor::new("9\nSouthwest (SW)\n"), &mut output).unwrap(),
            Some(CompassDirection::Southwest)
        );
    }
}

//! Line-oriented operation scripts
//!
//! ```text
//! # rotate 30 degrees about 45N 10W, in 5 steps
//! r 45 -10 30 5
//! # then move 250 km due east
//! t 90 250
//! ```

use crate::error::{GeoError, Result};
use crate::geometry::SphericalPoint;
use crate::transform::{Coord, Operation, TransformOutput, TransformRequest, apply};

/// One parsed script line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptLine {
    /// 1-based line number in the source text
    pub line: usize,
    pub operation: Operation,
    pub steps: usize,
}

/// Parse a script of `r lat lon angle [steps]` and `t heading distance [steps]` lines
///
/// Blank lines and lines starting with `#` are skipped.
pub fn parse_script(text: &str) -> Result<Vec<ScriptLine>> {
    text.lines()
        .enumerate()
        .filter_map(|(i, raw)| {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                None
            } else {
                Some(parse_line(i + 1, trimmed))
            }
        })
        .collect()
}

fn parse_line(line: usize, text: &str) -> Result<ScriptLine> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    let arg = |index: usize, what: &str| -> Result<f64> {
        let field = fields.get(index).ok_or_else(|| {
            GeoError::InvalidInput(format!("line {}: missing {}", line, what))
        })?;
        field
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| {
                GeoError::InvalidInput(format!(
                    "line {}: expected {} as a number, got '{}'",
                    line, what, field
                ))
            })
    };

    let (operation, arity) = match fields[0] {
        "r" => {
            let lat = arg(1, "pole latitude")?;
            let lon = arg(2, "pole longitude")?;
            let azimuth = arg(3, "rotation angle")?;
            let pole = SphericalPoint::new(lat, lon).map_err(|e| e.at_line(line))?;
            (Operation::Rotate { pole, azimuth }, 4)
        }
        "t" => {
            let bearing = arg(1, "heading")?;
            let distance = arg(2, "distance in km")?;
            (Operation::Translate { bearing, distance }, 3)
        }
        other => {
            return Err(GeoError::InvalidInput(format!(
                "line {}: unknown operation '{}', expected 'r lat lon angle' or 't heading distance'",
                line, other
            )));
        }
    };

    let steps = match fields.get(arity) {
        None => 1,
        Some(field) => field.parse::<usize>().map_err(|_| {
            GeoError::InvalidInput(format!(
                "line {}: expected steps as a whole number, got '{}'",
                line, field
            ))
        })?,
    };
    if fields.len() > arity + 1 {
        return Err(GeoError::InvalidInput(format!(
            "line {}: unexpected trailing '{}'",
            line,
            fields[arity + 1..].join(" ")
        )));
    }

    Ok(ScriptLine {
        line,
        operation,
        steps,
    })
}

/// Run every script line over `coords` on a sphere of `radius` km, each feeding the next
///
/// Returns one output per line.
pub fn run_script(
    script: &[ScriptLine],
    coords: &[Coord],
    radius: f64,
) -> Result<Vec<TransformOutput>> {
    let mut current = coords.to_vec();
    let mut outputs = Vec::with_capacity(script.len());

    for entry in script {
        let request = TransformRequest::on_sphere(entry.operation, &current, entry.steps, radius)
            .map_err(|e| e.at_line(entry.line))?;
        let output = apply(&request);
        current = output.last().to_vec();
        outputs.push(output);
    }

    Ok(outputs)
}

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::fmt::SubscriberBuilder;

use geoshift::batch::{parse_script, run_script};
use geoshift::config::{FileConfig, OutputFormat};
use geoshift::domain::{Shape, shapes_from_json, shapes_to_json};
use geoshift::geometry::{Path, SphericalPoint, parse_dms};
use geoshift::ops;
use geoshift::transform::{
    CorrespondencePair, Operation, TransformOutput, TransformRequest, apply,
    correspondences_from_shapes,
};

/// Rotate, translate and simplify shapes on a spherical earth
///
/// Points are written as lat,lon in decimal degrees or DMS.
///
/// Examples:
///   # Distance and bearing from Cambridge to Paris
///   geoshift distance 52.205,0.119 48.857,2.351
///   geoshift --format dms bearing 52.205,0.119 48.857,2.351
///
///   # Rotate every shape 30 degrees about 45N 10W in 10 frames
///   geoshift rotate -i shapes.json --pole 45,-10 --angle 30 --steps 10
///
///   # Recover the rotation between two placements of a shape
///   geoshift euler --before old.json --after new.json
///
///   # Run a script of r/t lines
///   geoshift batch -i shapes.json --script moves.txt -o moved.json
#[derive(Parser, Debug)]
#[command(name = "geoshift")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches geoshift.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Point output format
    #[arg(long, global = true)]
    format: Option<OutputFormat>,

    /// Decimal places for decimal output
    #[arg(long, global = true)]
    precision: Option<usize>,

    /// Sphere radius in km (clamped to 6353..6384)
    #[arg(long, global = true)]
    radius: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Great-circle distance in km
    Distance {
        #[arg(allow_hyphen_values = true)]
        from: String,
        #[arg(allow_hyphen_values = true)]
        to: String,
    },
    /// Initial bearing from one point toward another
    Bearing {
        #[arg(allow_hyphen_values = true)]
        from: String,
        #[arg(allow_hyphen_values = true)]
        to: String,
    },
    /// Point halfway along the great circle
    Midpoint {
        #[arg(allow_hyphen_values = true)]
        from: String,
        #[arg(allow_hyphen_values = true)]
        to: String,
    },
    /// Point reached from a start on a bearing after a distance in km
    Destination {
        #[arg(allow_hyphen_values = true)]
        start: String,
        #[arg(long, allow_hyphen_values = true)]
        bearing: String,
        #[arg(long, allow_hyphen_values = true)]
        distance: f64,
    },
    /// Crossing of two great-circle paths
    ///
    /// Each path is a start point plus either an end point (lat,lon) or a bearing.
    Intersect {
        #[arg(allow_hyphen_values = true)]
        start1: String,
        #[arg(allow_hyphen_values = true)]
        toward1: String,
        #[arg(allow_hyphen_values = true)]
        start2: String,
        #[arg(allow_hyphen_values = true)]
        toward2: String,
    },
    /// Signed distance in km from a point to a path, positive to the right
    CrossTrack {
        #[arg(allow_hyphen_values = true)]
        point: String,
        #[arg(allow_hyphen_values = true)]
        start: String,
        /// End point (lat,lon) or bearing of the path
        #[arg(allow_hyphen_values = true)]
        toward: String,
    },
    /// Whether a point lies inside a convex polygon
    Enclosed {
        #[arg(allow_hyphen_values = true)]
        point: String,
        /// Polygon vertices, in order
        #[arg(required = true, num_args = 3.., allow_hyphen_values = true)]
        polygon: Vec<String>,
    },
    /// Geographic mean of points
    Centroid {
        #[arg(required = true, allow_hyphen_values = true)]
        points: Vec<String>,
    },
    /// Solve the rotation pole and angle between two placements
    Euler {
        /// Correspondences as START1 END1 START2 END2
        #[arg(
            num_args = 4,
            value_names = ["START1", "END1", "START2", "END2"],
            allow_hyphen_values = true
        )]
        pairs: Vec<String>,

        /// Shape list before the move
        #[arg(long, requires = "after", conflicts_with = "pairs")]
        before: Option<PathBuf>,

        /// Shape list after the move
        #[arg(long, requires = "before")]
        after: Option<PathBuf>,

        /// Name of the shape to compare (defaults to the first)
        #[arg(long)]
        shape: Option<String>,

        /// Vertex indices used as correspondences, e.g. 0,3
        #[arg(long, value_delimiter = ',')]
        indices: Option<Vec<usize>>,
    },
    /// Rotate shapes about a pole
    Rotate {
        #[command(flatten)]
        io: ShapeIo,

        /// Rotation pole as lat,lon
        #[arg(long, allow_hyphen_values = true, required_unless_present = "centroid")]
        pole: Option<String>,

        /// Rotate each shape about its own centroid
        #[arg(long, conflicts_with = "pole")]
        centroid: bool,

        /// Clockwise angle in degrees, seen from above the pole
        #[arg(long, allow_hyphen_values = true)]
        angle: f64,

        /// Interpolated frames to emit (1-50)
        #[arg(long)]
        steps: Option<usize>,
    },
    /// Move shapes along a bearing
    Translate {
        #[command(flatten)]
        io: ShapeIo,

        #[arg(long, allow_hyphen_values = true)]
        bearing: String,

        /// Distance in km
        #[arg(long, allow_hyphen_values = true)]
        distance: f64,

        /// Interpolated frames to emit (1-50)
        #[arg(long)]
        steps: Option<usize>,
    },
    /// Drop vertices that deviate less than a threshold
    Simplify {
        #[command(flatten)]
        io: ShapeIo,

        /// Threshold in meters
        #[arg(long)]
        kink: Option<f64>,
    },
    /// Apply a script of `r lat lon angle [steps]` / `t heading km [steps]` lines
    Batch {
        #[command(flatten)]
        io: ShapeIo,

        #[arg(long)]
        script: PathBuf,

        /// Also emit every intermediate frame
        #[arg(long)]
        frames: bool,
    },
}

#[derive(clap::Args, Debug)]
struct ShapeIo {
    /// JSON shape list to read
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Output JSON path (defaults to stdout)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

/// Settings after merging flags over the config file
struct Settings {
    format: OutputFormat,
    precision: usize,
    radius_km: f64,
    kink_m: f64,
    steps: usize,
    correspondence: [usize; 2],
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = if let Some(ref config_path) = args.config {
        if config_path.exists() {
            FileConfig::from_path(config_path)?
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load().unwrap_or_default()
    };

    let verbose = args.verbose || file_config.verbose;
    if verbose {
        SubscriberBuilder::default()
            .with_target(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    let settings = Settings {
        format: args.format.unwrap_or(file_config.format),
        precision: args.precision.unwrap_or(file_config.precision),
        radius_km: args.radius.unwrap_or(file_config.radius_km),
        kink_m: file_config.kink_m,
        steps: file_config.steps,
        correspondence: file_config.correspondence,
    };

    match args.command {
        Command::Distance { from, to } => {
            let (p1, p2) = (settings.point(&from)?, settings.point(&to)?);
            println!("{:.3} km", ops::distance(&p1, &p2));
        }
        Command::Bearing { from, to } => {
            let (p1, p2) = (settings.point(&from)?, settings.point(&to)?);
            let bearing = ops::bearing(&p1, &p2).context("Cannot compute bearing")?;
            println!("{}", settings.format.bearing(bearing, settings.precision));
        }
        Command::Midpoint { from, to } => {
            let (p1, p2) = (settings.point(&from)?, settings.point(&to)?);
            let mid = ops::midpoint(&p1, &p2).context("Cannot compute midpoint")?;
            println!("{}", settings.show(&mid));
        }
        Command::Destination {
            start,
            bearing,
            distance,
        } => {
            let start = settings.point(&start)?;
            let bearing = parse_angle(&bearing)?;
            println!(
                "{}",
                settings.show(&ops::destination(&start, bearing, distance))
            );
        }
        Command::Intersect {
            start1,
            toward1,
            start2,
            toward2,
        } => {
            let path1 = settings.path(&start1, &toward1)?;
            let path2 = settings.path(&start2, &toward2)?;
            match ops::intersect(&path1, &path2) {
                Some(crossing) => {
                    println!("{}", settings.show(&crossing));
                    println!("{}", settings.show(&crossing.antipode()));
                }
                None => bail!("Paths lie on the same great circle; no unique intersection"),
            }
        }
        Command::CrossTrack {
            point,
            start,
            toward,
        } => {
            let point = settings.point(&point)?;
            let path = settings.path(&start, &toward)?;
            println!("{:.4} km", ops::cross_track(&point, &path));
        }
        Command::Enclosed { point, polygon } => {
            let point = settings.point(&point)?;
            let polygon = settings.points(&polygon)?;
            let inside = ops::enclosed(&point, &polygon).context("Containment test failed")?;
            println!("{}", inside);
        }
        Command::Centroid { points } => {
            let points = settings.points(&points)?;
            let mean = ops::centroid(&points).context("No points given")?;
            println!("{}", settings.show(&mean));
        }
        Command::Euler {
            pairs,
            before,
            after,
            shape,
            indices,
        } => {
            let (pair1, pair2) = match (before, after) {
                (Some(before), Some(after)) => {
                    let [first, second] = match indices.as_deref() {
                        Some(&[first, second]) => [first, second],
                        Some(other) => bail!("--indices takes two values, got {}", other.len()),
                        None => settings.correspondence,
                    };
                    let before = pick_shape(read_shapes(&before)?, shape.as_deref())?;
                    let after = pick_shape(read_shapes(&after)?, shape.as_deref())?;
                    correspondences_from_shapes(
                        &before.spherical_points()?,
                        &after.spherical_points()?,
                        first,
                        second,
                    )
                    .with_context(|| format!("Cannot pair up vertices of '{}'", before.name))?
                }
                _ if pairs.len() == 4 => {
                    let points = settings.points(&pairs)?;
                    (
                        CorrespondencePair::new(points[0], points[1]),
                        CorrespondencePair::new(points[2], points[3]),
                    )
                }
                _ => bail!("Give START1 END1 START2 END2, or --before and --after shape files"),
            };

            let solution = ops::solve_euler_pole(&pair1, &pair2)?;
            for (label, rotation) in [("Pole", solution.primary), ("Antipodal", solution.antipodal)]
            {
                println!(
                    "{:<10} {}  angle {:.*}",
                    label,
                    settings.show(&rotation.pole),
                    settings.precision,
                    rotation.angle
                );
            }
        }
        Command::Rotate {
            io,
            pole,
            centroid,
            angle,
            steps,
        } => {
            let operation = match pole {
                Some(pole) if !centroid => Operation::Rotate {
                    pole: settings.point(&pole)?,
                    azimuth: angle,
                },
                _ => Operation::RotateAboutCentroid { azimuth: angle },
            };
            transform_shapes(&io, operation, steps.unwrap_or(settings.steps), &settings)?;
        }
        Command::Translate {
            io,
            bearing,
            distance,
            steps,
        } => {
            let operation = Operation::Translate {
                bearing: parse_angle(&bearing)?,
                distance,
            };
            transform_shapes(&io, operation, steps.unwrap_or(settings.steps), &settings)?;
        }
        Command::Simplify { io, kink } => {
            let operation = Operation::Simplify {
                kink: kink.unwrap_or(settings.kink_m),
            };
            transform_shapes(&io, operation, 1, &settings)?;
        }
        Command::Batch { io, script, frames } => {
            run_batch(&io, &script, frames, settings.radius_km)?;
        }
    }

    Ok(())
}

impl Settings {
    fn point(&self, text: &str) -> Result<SphericalPoint> {
        let (lat, lon) = text
            .split_once(',')
            .with_context(|| format!("Expected a point as lat,lon, got '{}'", text))?;
        let lat = parse_angle(lat)?;
        let lon = parse_angle(lon)?;
        SphericalPoint::with_height_radius(lat, lon, 0.0, self.radius_km)
            .with_context(|| format!("Invalid point '{}'", text))
    }

    fn points(&self, texts: &[String]) -> Result<Vec<SphericalPoint>> {
        texts.iter().map(|text| self.point(text)).collect()
    }

    /// A path from a start point toward an end point or along a bearing
    fn path(&self, start: &str, toward: &str) -> Result<Path> {
        let start = self.point(start)?;
        if toward.contains(',') {
            Ok(Path::Between(start, self.point(toward)?))
        } else {
            Ok(Path::Heading(start, parse_angle(toward)?))
        }
    }

    fn show(&self, point: &SphericalPoint) -> String {
        self.format.point(point, self.precision)
    }
}

fn parse_angle(text: &str) -> Result<f64> {
    parse_dms(text).with_context(|| format!("Invalid angle '{}'", text))
}

fn read_shapes(path: &std::path::Path) -> Result<Vec<Shape>> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    shapes_from_json(&contents).with_context(|| format!("Failed to parse shapes in {:?}", path))
}

fn write_shapes(shapes: &[Shape], output: Option<&std::path::Path>) -> Result<()> {
    let json = shapes_to_json(shapes)?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            eprintln!("Wrote {} shapes to {}", shapes.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn pick_shape(shapes: Vec<Shape>, name: Option<&str>) -> Result<Shape> {
    match name {
        Some(name) => shapes
            .into_iter()
            .find(|s| s.name == name)
            .with_context(|| format!("No shape named '{}'", name)),
        None => shapes.into_iter().next().context("Shape list is empty"),
    }
}

/// Name and points of every shape in `output`, frames suffixed `@i`
fn output_shapes(shape: &Shape, output: TransformOutput) -> Vec<Shape> {
    match output {
        TransformOutput::Single(points) => vec![shape.with_points(shape.name.clone(), points)],
        TransformOutput::Frames(frames) => frames
            .into_iter()
            .enumerate()
            .map(|(i, points)| shape.with_points(format!("{}@{}", shape.name, i), points))
            .collect(),
    }
}

fn transform_shapes(
    io: &ShapeIo,
    operation: Operation,
    steps: usize,
    settings: &Settings,
) -> Result<()> {
    let start = Instant::now();
    let shapes = read_shapes(&io.input)?;

    let pb = create_progress_bar(shapes.len() as u64, "Transforming shapes");
    let mut results = Vec::new();
    for shape in &shapes {
        let request =
            TransformRequest::on_sphere(operation, &shape.points, steps, settings.radius_km)
                .with_context(|| format!("Cannot transform shape '{}'", shape.name))?;
        results.extend(output_shapes(shape, apply(&request)));
        pb.inc(1);
    }
    pb.finish_with_message(format!(
        "Transformed {} shapes [{:.1}s]",
        shapes.len(),
        start.elapsed().as_secs_f32()
    ));

    write_shapes(&results, io.output.as_deref())
}

fn run_batch(
    io: &ShapeIo,
    script_path: &std::path::Path,
    frames: bool,
    radius_km: f64,
) -> Result<()> {
    let spinner = create_spinner("Reading script...");
    let text = std::fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read script {:?}", script_path))?;
    let script = parse_script(&text).context("Failed to parse script")?;
    spinner.finish_with_message(format!("Parsed {} script lines", script.len()));

    let start = Instant::now();
    let shapes = read_shapes(&io.input)?;
    let pb = create_progress_bar(shapes.len() as u64, "Running script");
    let mut results = Vec::new();

    for shape in &shapes {
        let outputs = run_script(&script, &shape.points, radius_km)
            .with_context(|| format!("Script failed on shape '{}'", shape.name))?;

        if frames {
            // one running frame count across all lines; each line's frame 0
            // repeats the previous line's result and is skipped
            let mut index = 0;
            results.push(shape.with_points(format!("{}@{}", shape.name, index), shape.points.clone()));
            for output in outputs.iter() {
                let frames = output.clone().into_frames();
                let skip = usize::from(frames.len() > 1);
                for points in frames.into_iter().skip(skip) {
                    index += 1;
                    results.push(shape.with_points(format!("{}@{}", shape.name, index), points));
                }
            }
        } else {
            let last = outputs
                .last()
                .map(|output| output.last().to_vec())
                .unwrap_or_else(|| shape.points.clone());
            results.push(shape.with_points(shape.name.clone(), last));
        }
        pb.inc(1);
    }
    pb.finish_with_message(format!(
        "Ran {} lines over {} shapes [{:.1}s]",
        script.len(),
        shapes.len(),
        start.elapsed().as_secs_f32()
    ));

    write_shapes(&results, io.output.as_deref())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("{msg} [{bar:30.green}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message(message.to_string());
    pb
}

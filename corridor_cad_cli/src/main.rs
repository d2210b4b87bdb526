use clap::{Parser, Subcommand, ValueEnum};
use corridor_cad::{
    alignment::{decode, Alignment, ChangeEvent},
    config::{DiscretizeConfig, SubdivisionPolicy},
    geometry::{Point, Point3},
    io::{read_alignment_json, write_points_csv},
    surveying::format_bearing,
    AlignmentError,
};

fn print_point(p: Point3) {
    println!("{:.3},{:.3},{:.3}", p.x, p.y, p.z);
}

fn print_errors(errors: &[AlignmentError]) {
    for e in errors {
        eprintln!("Warning: {}", e);
    }
}

fn fail(msg: String) -> ! {
    eprintln!("{}", msg);
    std::process::exit(1);
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    Segment,
    Interval,
    Tolerance,
}

fn subdivision_policy(policy: Policy, value: Option<f64>) -> Result<SubdivisionPolicy, String> {
    match (policy, value) {
        (Policy::Segment, None) => Ok(SubdivisionPolicy::default()),
        (Policy::Segment, Some(n)) if n.is_finite() && n >= 0.0 && n <= f64::from(u32::MAX) => {
            Ok(SubdivisionPolicy::Segment(n.round() as u32))
        }
        (Policy::Segment, Some(n)) => Err(format!("Invalid segment count {}", n)),
        (Policy::Interval, Some(len)) => Ok(SubdivisionPolicy::Interval(len)),
        (Policy::Tolerance, Some(tol)) => Ok(SubdivisionPolicy::Tolerance(tol)),
        (_, None) => Err("--value is required for interval and tolerance policies".to_string()),
    }
}

/// Horizontal alignment tools: decode PI tables, discretize curves and
/// resolve stations.
#[derive(Parser)]
#[command(name = "corridor_cad_cli", version)]
struct Cli {
    /// JSON discretization settings replacing those stored in alignment files
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the geometry elements decoded from an alignment file.
    Decode { path: String },
    /// Discretize an alignment, printing x,y,z points or writing them to CSV.
    Discretize {
        path: String,
        #[arg(long, value_enum)]
        policy: Option<Policy>,
        #[arg(long, requires = "policy")]
        value: Option<f64>,
        #[arg(long)]
        output: Option<String>,
    },
    /// Locate a station on an alignment.
    Station {
        path: String,
        #[arg(allow_negative_numbers = true)]
        station: f64,
    },
    /// Offset that moves a child alignment onto its parent.
    IntersectionDelta { parent: String, child: String },
}

fn load_alignment(path: &str, config: Option<&DiscretizeConfig>) -> Alignment {
    let file = match read_alignment_json(path) {
        Ok(f) => f,
        Err(e) => fail(format!("Error reading {}: {}", path, e)),
    };
    let mut alignment = file.into_alignment(&DiscretizeConfig::default());
    if let Some(cfg) = config {
        alignment.apply(ChangeEvent::PolicyChanged(cfg.clone()));
    }
    alignment
}

fn main() {
    env_logger::Builder::from_default_env().init();
    let cli = Cli::parse();
    let config = cli.config.as_deref().map(|path| match DiscretizeConfig::read_json(path) {
        Ok(cfg) => cfg,
        Err(e) => fail(format!("Error reading {}: {}", path, e)),
    });

    match cli.command {
        Commands::Decode { path } => {
            let alignment = load_alignment(&path, config.as_ref());
            let decoded = decode(alignment.pis(), alignment.datum(), alignment.config());
            print_errors(&decoded.errors);
            let origin: Point = decoded.origin + alignment.placement();
            println!("Origin: {:.3},{:.3}", origin.x, origin.y);
            for (i, e) in decoded.elements.iter().enumerate() {
                println!(
                    "{},{:.3},{},{:.3},{:.3}",
                    i,
                    e.tangent_length_from_prev,
                    format_bearing(e.bearing_in),
                    e.radius,
                    e.spiral_length
                );
            }
        }
        Commands::Discretize {
            path,
            policy,
            value,
            output,
        } => {
            let mut alignment = load_alignment(&path, config.as_ref());
            if let Some(policy) = policy {
                match subdivision_policy(policy, value) {
                    Ok(p) => {
                        let cfg = DiscretizeConfig {
                            policy: p,
                            ..alignment.config().clone()
                        };
                        alignment.apply(ChangeEvent::PolicyChanged(cfg));
                    }
                    Err(msg) => fail(msg),
                }
            }
            let regenerated = alignment.regenerate();
            print_errors(&regenerated.errors);
            match output {
                Some(output) => match write_points_csv(&output, &regenerated.shape.vertices) {
                    Ok(()) => println!(
                        "Wrote {} points to {}",
                        regenerated.shape.vertices.len(),
                        output
                    ),
                    Err(e) => fail(format!("Error writing {}: {}", output, e)),
                },
                None => {
                    for p in &regenerated.shape.vertices {
                        print_point(*p);
                    }
                }
            }
        }
        Commands::Station { path, station } => {
            let mut alignment = load_alignment(&path, config.as_ref());
            match alignment.resolve_station(station) {
                Ok(r) => {
                    println!("Distance: {:.3}", r.distance);
                    print_point(r.point);
                }
                Err(e) => fail(format!("Error: {}", e)),
            }
        }
        Commands::IntersectionDelta { parent, child } => {
            let mut parent_alignment = load_alignment(&parent, config.as_ref());
            let mut child_alignment = load_alignment(&child, config.as_ref());
            match child_alignment.intersection_delta(&mut parent_alignment) {
                Ok(Some(d)) => println!("Delta: {:.3},{:.3}", d.x, d.y),
                Ok(None) => fail(format!("{} has no intersection equation", child)),
                Err(e) => fail(format!("Error: {}", e)),
            }
        }
    }
}

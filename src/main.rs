//! Entry point for the h5_extract binary.
//! Handles CLI parsing and dispatches to inspection or extraction.

use clap::Parser;
use h5_extract::cli::Args;
use h5_extract::errors::ExtractError;
use h5_extract::extract::extract;
use h5_extract::logging::init_logging;
use h5_extract::metadata::{describe_dataset, format_bytes, list_datasets, print_datasets};
use h5_extract::plan::ExtractionPlan;
use h5_extract::source::{Hdf5Matrix, MatrixSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    println!(
        r#"
------------------------------------------------------------------
                 _     ____             _                  _
                | |__ | ___|   _____  _| |_ _ __ __ _  ___| |_
                | '_ \|___ \  / _ \ \/ / __| '__/ _` |/ __| __|
                | | | |___) ||  __/>  <| |_| | | (_| | (__| |_
                |_| |_|____/  \___/_/\_\\__|_|  \__,_|\___|\__|
                  Chunked HDF5 matrix to text extractor
------------------------------------------------------------------
                        "#
    );

    let config = args.to_config()?;

    if args.is_inspection() {
        if config.input_path.as_os_str().is_empty() {
            return Err(ExtractError::InvalidConfig {
                message: "input_path is required (use --input)".to_string(),
            }
            .into());
        }

        if args.list_datasets {
            let file = hdf5::File::open(&config.input_path)?;
            print_datasets(&list_datasets(&file)?);
        }

        if let Some(path) = &args.describe {
            let file = hdf5::File::open(&config.input_path)?;
            describe_dataset(&file, path)?.print();
        }

        if args.plan {
            let source = Hdf5Matrix::open(&config.input_path, &config.dataset_path)?;
            let plan = ExtractionPlan::new(
                source.shape(),
                config.target_bytes,
                config.element_byte_width,
                config.chunk_row_count,
            )?;
            println!(" Source: {}", source.describe());
            println!(" Stored element size: {} bytes", source.element_size());
            plan.print();
        }

        return Ok(());
    }

    let summary = extract(&config)?;

    println!(
        "✅ Extracted {} rows (~{}) saved to {}",
        summary.stats.rows_written,
        format_bytes(summary.bytes_written),
        summary.output_path.display()
    );
    if let Some(manifest) = &summary.manifest_path {
        println!("📝 Manifest written to {}", manifest.display());
    }

    Ok(())
}

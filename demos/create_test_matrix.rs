//! Creates a sample HDF5 matrix for trying out h5_extract.
//!
//! The file mimics the layout pandas writes for a fixed-format `HDFStore`
//! table: a group `t` holding the values under `block0_values`. Every 7th
//! value is NaN so the NaN replacement is visible in the output.
//!
//! ``` ignore
//! cargo run --example create_test_matrix
//! cargo run -- --input test_matrix.h5 --output extracted.txt --target-size 64K
//! ```

use ndarray::Array2;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = Path::new("test_matrix.h5");
    let rows = 2_000;
    let columns = 16;

    println!("🔨 Creating test HDF5 file: {}", output_path.display());

    // Remove existing file if it exists
    if output_path.exists() {
        std::fs::remove_file(output_path)?
    }

    let file = hdf5::File::create(output_path)?;
    let table = file.create_group("t")?;

    let values = Array2::from_shape_fn((rows, columns), |(i, j)| {
        let k = i * columns + j;
        if k % 7 == 0 {
            f32::NAN
        } else {
            (i as f32) * 0.5 + j as f32
        }
    });

    let dataset = table
        .new_dataset::<f32>()
        .chunk((500, columns))
        .shape((rows, columns))
        .create("block0_values")?;
    dataset.write(&values)?;

    println!("✅ Wrote t/block0_values ({} × {}, float32)", rows, columns);
    println!("💡 Tip: Use --list-datasets to inspect the file");

    Ok(())
}

use h5_extract::{
    config::ExtractConfig,
    errors::{ExtractError, Result},
    extract::extract,
    metadata::{describe_dataset, list_datasets},
    source::{Hdf5Matrix, MatrixSource},
    writer::{ExtractManifest, FloatFormat},
};
use ndarray::{Array2, Array3};
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// Writes `values` as `t/block0_values`, the pandas `HDFStore` layout.
fn create_store<T: hdf5::H5Type>(path: &Path, values: &Array2<T>) -> Result<()> {
    let file = hdf5::File::create(path)?;
    let table = file.create_group("t")?;
    let dataset = table
        .new_dataset::<T>()
        .shape(values.dim())
        .create("block0_values")?;
    dataset.write(values)?;
    Ok(())
}

/// `rows × 4` float32 matrix with NaN at every 5th element
fn sample_values(rows: usize) -> Array2<f32> {
    Array2::from_shape_fn((rows, 4), |(i, j)| {
        if (i * 4 + j) % 5 == 0 {
            f32::NAN
        } else {
            i as f32 * 0.5 + j as f32
        }
    })
}

fn setup(rows: usize) -> Result<(TempDir, PathBuf)> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("matrix.h5");
    create_store(&input, &sample_values(rows))?;
    Ok((temp_dir, input))
}

#[test]
fn test_extract_scenario_two_chunks() -> Result<()> {
    let (temp_dir, input) = setup(1000)?;
    let output = temp_dir.path().join("extracted.txt");

    let mut config = ExtractConfig::new(&input, &output);
    config.target_bytes = 16_000;

    let summary = extract(&config)?;
    assert_eq!(summary.plan.rows_to_extract, 1000);
    assert_eq!(summary.stats.rows_written, 1000);
    assert_eq!(summary.stats.chunks, 2);
    assert_eq!(summary.stats.nans_replaced, 800);
    assert_eq!(summary.output_path, output);
    assert!(summary.manifest_path.is_none());

    let text = std::fs::read_to_string(&output)?;
    assert_eq!(summary.bytes_written, text.len() as u64);

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1000);
    assert_eq!(lines[0], "0 1 2 3");
    assert_eq!(lines[1], "0 0 2 3");
    // row 999: k = 3996..3999, NaN at 3995 is in row 998
    assert_eq!(lines[999], "499 500 501 502");

    for line in &lines {
        assert_eq!(line.split(' ').count(), 4);
        assert!(line.split(' ').all(|v| v.parse::<i32>().is_ok()));
    }
    Ok(())
}

#[test]
fn test_extract_respects_budget() -> Result<()> {
    let (temp_dir, input) = setup(1000)?;
    let output = temp_dir.path().join("budget.txt");

    let mut config = ExtractConfig::new(&input, &output);
    // 1600 bytes / 4 = 400 elements = 100 rows of 4
    config.target_bytes = 1600;
    config.chunk_row_count = 30;

    let summary = extract(&config)?;
    assert_eq!(summary.stats.rows_written, 100);
    assert_eq!(summary.stats.chunks, 4);
    assert_eq!(std::fs::read_to_string(&output)?.lines().count(), 100);
    Ok(())
}

#[test]
fn test_extract_is_idempotent() -> Result<()> {
    let (temp_dir, input) = setup(257)?;
    let first = temp_dir.path().join("first.txt");
    let second = temp_dir.path().join("second.txt");

    let mut config = ExtractConfig::new(&input, &first);
    config.chunk_row_count = 64;
    extract(&config)?;

    config.output_path = second.clone();
    extract(&config)?;

    assert_eq!(std::fs::read(&first)?, std::fs::read(&second)?);
    Ok(())
}

#[test]
fn test_extract_zero_rows_creates_empty_file() -> Result<()> {
    let (temp_dir, input) = setup(10)?;
    let output = temp_dir.path().join("empty.txt");

    let mut config = ExtractConfig::new(&input, &output);
    config.target_bytes = 8;

    let summary = extract(&config)?;
    assert_eq!(summary.plan.rows_to_extract, 0);
    assert_eq!(summary.stats.chunks, 0);
    assert!(output.exists());
    assert_eq!(std::fs::metadata(&output)?.len(), 0);
    Ok(())
}

#[test]
fn test_extract_float_output() -> Result<()> {
    let (temp_dir, input) = setup(3)?;
    let output = temp_dir.path().join("float.txt");

    let mut config = ExtractConfig::new(&input, &output);
    config.cast_to_integer = false;
    config.replace_nan = false;

    extract(&config)?;
    let text = std::fs::read_to_string(&output)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["NaN 1 2 3", "0.5 NaN 2.5 3.5", "1 2 NaN 4"]);

    config.replace_nan = true;
    config.float_format = FloatFormat::Fixed(1);
    extract(&config)?;
    let text = std::fs::read_to_string(&output)?;
    assert_eq!(text.lines().next(), Some("0.0 1.0 2.0 3.0"));
    Ok(())
}

#[test]
fn test_extract_integer_dataset() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("ints.h5");
    let values = Array2::from_shape_fn((5, 3), |(i, j)| (i as i64 - 2) * 1_000_000 + j as i64);
    create_store(&input, &values)?;

    let output = temp_dir.path().join("ints.txt");
    let mut config = ExtractConfig::new(&input, &output);
    config.integer_type = h5_extract::transform::IntegerType::I64;
    config.element_byte_width = 8;
    extract(&config)?;

    let text = std::fs::read_to_string(&output)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "-2000000 -1999999 -1999998");
    assert_eq!(lines[4], "2000000 2000001 2000002");
    Ok(())
}

#[test]
fn test_extract_writes_manifest() -> Result<()> {
    let (temp_dir, input) = setup(20)?;
    let output = temp_dir.path().join("with_manifest.txt");

    let mut config = ExtractConfig::new(&input, &output);
    config.write_manifest = true;
    config.chunk_row_count = 7;

    let summary = extract(&config)?;
    let manifest_path = summary.manifest_path.expect("manifest requested");
    assert_eq!(manifest_path, ExtractManifest::path_for(&output));

    let manifest = ExtractManifest::read(&manifest_path)?;
    assert!(manifest.complete);
    assert_eq!(manifest.rows, 20);
    assert_eq!(manifest.columns, 4);
    assert_eq!(manifest.chunks, 3);
    assert_eq!(manifest.format, "int32");
    assert_eq!(manifest.bytes_written, std::fs::metadata(&output)?.len());
    Ok(())
}

#[test]
fn test_missing_dataset() -> Result<()> {
    let (temp_dir, input) = setup(4)?;
    let output = temp_dir.path().join("never.txt");

    for path in ["t/block1_values", "x/y/z", "missing"] {
        let mut config = ExtractConfig::new(&input, &output);
        config.dataset_path = path.to_string();
        match extract(&config) {
            Err(ExtractError::DatasetNotFound { path: reported }) => assert_eq!(reported, path),
            other => panic!("Expected DatasetNotFound for {}, got {:?}", path, other),
        }
    }
    assert!(!output.exists());
    assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 1);
    Ok(())
}

#[test]
fn test_non_matrix_dataset() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("cube.h5");
    {
        let file = hdf5::File::create(&input)?;
        let cube = Array3::<f32>::zeros((2, 3, 4));
        let dataset = file.new_dataset::<f32>().shape((2, 3, 4)).create("cube")?;
        dataset.write(&cube)?;
    }

    let result = Hdf5Matrix::open(&input, "cube");
    assert!(matches!(result, Err(ExtractError::InvalidShape { .. })));
    Ok(())
}

#[test]
fn test_hdf5_matrix_reads_row_ranges() -> Result<()> {
    let (_temp_dir, input) = setup(50)?;
    let matrix = Hdf5Matrix::open(&input, "/t/block0_values")?;
    assert_eq!(matrix.shape(), (50, 4));
    assert_eq!(matrix.element_size(), 4);

    let rows = matrix.read_rows(10..12)?;
    assert_eq!(rows.dim(), (2, 4));
    // row 10: k = 40..43, NaN at 40
    assert!(rows[[0, 0]].is_nan());
    assert_eq!(rows[[0, 1]], 6.0);
    assert_eq!(rows[[1, 3]], 8.5);

    assert!(matches!(
        matrix.read_rows(49..51),
        Err(ExtractError::InvalidShape { .. })
    ));
    Ok(())
}

#[test]
fn test_list_and_describe_datasets() -> Result<()> {
    let (_temp_dir, input) = setup(12)?;
    let file = hdf5::File::open(&input)?;

    let datasets = list_datasets(&file)?;
    assert_eq!(datasets.len(), 1);
    let info = &datasets[0];
    assert_eq!(info.path, "/t/block0_values");
    assert_eq!(info.shape, vec![12, 4]);
    assert_eq!(info.element_size, 4);
    assert_eq!(info.total_elements, 48);
    assert_eq!(info.estimated_size_bytes, 192);
    assert!(info.is_matrix());
    info.print();

    let described = describe_dataset(&file, "t/block0_values")?;
    assert_eq!(&described, info);

    assert!(matches!(
        describe_dataset(&file, "t/nope"),
        Err(ExtractError::DatasetNotFound { .. })
    ));
    Ok(())
}

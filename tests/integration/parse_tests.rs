//! End-to-end acquisition parsing tests.

use std::fs;

use drogon_converter::{
    parse_acquisition, parse_acquisitions, AcquisitionSource, ParseError, ParseOptions, PixelType,
    TileData, TileLoader, TIFF_SUBDIR,
};

use super::test_utils::{gradient, init_tracing, AcquisitionFixture};

const CHANNELS_YML: &str = "channels.yml";

fn default_options() -> ParseOptions {
    ParseOptions::new(CHANNELS_YML)
}

// =============================================================================
// Happy Path
// =============================================================================

#[test]
fn test_two_well_layout_with_partial_acquisition() {
    init_tracing();
    let fixture = AcquisitionFixture::new();
    fixture.write_channels(CHANNELS_YML, "ch1: DAPI\nch2: GFP\n");
    let layout = fixture.write_layout("row,1,2\nA,WT,KO\n");

    // Two planes for A01, none for A02.
    let width = 8;
    let height = 4;
    fixture.write_plane("mip_A01_1.tif", width, height, &gradient(0, width, height));
    fixture.write_plane("mip_A01_2.tif", width, height, &gradient(500, width, height));

    let options = default_options().with_pixel_size_um(0.5);
    let images = parse_acquisition(fixture.root(), &layout, "plate1", 0, &options).unwrap();

    assert_eq!(images.len(), 1);
    let image = &images[0];
    assert_eq!(image.name(), "A01");
    assert_eq!(image.channel_names(), ["DAPI", "GFP"]);
    assert_eq!(image.attributes()["cell_line"], "WT");
    assert_eq!(image.attributes()["time_point"], "0");

    let builder = image.path_builder();
    assert_eq!(builder.plate_name, "plate1");
    assert_eq!(builder.row, "A");
    assert_eq!(builder.column, 1);
    assert_eq!(builder.acquisition_id, 0);

    assert_eq!(image.tiles().len(), 1);
    let tile = &image.tiles()[0];
    assert_eq!(tile.top_l.x, 0.0);
    assert_eq!(tile.top_l.y, 0.0);
    assert_eq!(tile.diag.x, width as f64 * 0.5);
    assert_eq!(tile.diag.y, height as f64 * 0.5);
    assert_eq!(tile.diag.c, 2);
    assert_eq!(tile.diag.t, 1);
    assert_eq!(tile.pixel_size.x, 0.5);
    assert_eq!(tile.pixel_size.z, 1.0);
}

#[test]
fn test_loader_round_trip_through_assembled_tile() {
    let fixture = AcquisitionFixture::new();
    fixture.write_channels(CHANNELS_YML, "ch1: DAPI\nch2: GFP\n");
    let layout = fixture.write_layout("row,1\nB,WT\n");

    let width = 4;
    let height = 3;
    let plane0 = gradient(0, width, height);
    let plane1 = gradient(1000, width, height);
    // Lexical order of the file names fixes plane 0 and plane 1.
    fixture.write_plane("mip_B01_0.tif", width, height, &plane0);
    fixture.write_plane("mip_B01_1.tif", width, height, &plane1);

    let images = parse_acquisition(fixture.root(), &layout, "p", 0, &default_options()).unwrap();
    let loader = images[0].tiles()[0].loader();

    let shape = loader.shape().unwrap();
    assert_eq!(shape.as_tuple(), (1, 2, 1, height as usize, width as usize));
    assert_eq!(loader.dtype().unwrap(), PixelType::U16);

    let TileData::U16(array) = loader.load().unwrap() else {
        panic!("expected u16 tile");
    };
    for y in 0..height as usize {
        for x in 0..width as usize {
            assert_eq!(array[[0, 0, 0, y, x]], plane0[y * width as usize + x]);
            assert_eq!(array[[0, 1, 0, y, x]], plane1[y * width as usize + x]);
        }
    }
}

#[test]
fn test_output_follows_layout_order_not_discovery_order() {
    let fixture = AcquisitionFixture::new();
    fixture.write_channels(CHANNELS_YML, "ch1: DAPI\n");
    // Column-major layout order: C01, A01, C02, A02.
    let layout = fixture.write_layout("row,1,2\nC,a,b\nA,c,d\n");

    for well in ["A01", "A02", "C01", "C02"] {
        fixture.write_plane(&format!("mip_{well}_1.tif"), 2, 2, &gradient(0, 2, 2));
    }

    let images = parse_acquisition(fixture.root(), &layout, "p", 0, &default_options()).unwrap();
    let names: Vec<_> = images.iter().map(|i| i.name().to_string()).collect();
    assert_eq!(names, vec!["C01", "A01", "C02", "A02"]);
}

#[test]
fn test_time_point_attribute() {
    let fixture = AcquisitionFixture::new();
    fixture.write_channels(CHANNELS_YML, "ch1: DAPI\n");
    let layout = fixture.write_layout("row,1\nA,WT\n");
    fixture.write_plane("mip_A01_1.tif", 2, 2, &gradient(0, 2, 2));

    let options = default_options().with_time_point(7);
    let images = parse_acquisition(fixture.root(), &layout, "p", 0, &options).unwrap();
    assert_eq!(images[0].attributes()["time_point"], "7");
}

// =============================================================================
// Input Validation
// =============================================================================

#[test]
fn test_missing_channel_file_fails_before_tiff_scan() {
    // The TIFF directory is empty too; the channel metadata error must win.
    let fixture = AcquisitionFixture::new();
    let layout = fixture.write_layout("row,1\nA,WT\n");

    let err = parse_acquisition(fixture.root(), &layout, "p", 0, &default_options()).unwrap_err();
    match err {
        ParseError::MissingInput { path } => {
            assert!(path.ends_with(CHANNELS_YML), "unexpected path {path:?}");
        }
        other => panic!("expected MissingInput, got {other:?}"),
    }
}

#[test]
fn test_missing_tiff_directory() {
    let fixture = AcquisitionFixture::new();
    fixture.write_channels(CHANNELS_YML, "ch1: DAPI\n");
    let layout = fixture.write_layout("row,1\nA,WT\n");
    fs::remove_dir(fixture.tiff_dir()).unwrap();

    let err = parse_acquisition(fixture.root(), &layout, "p", 0, &default_options()).unwrap_err();
    match err {
        ParseError::MissingInput { path } => {
            assert!(path.ends_with(TIFF_SUBDIR), "unexpected path {path:?}");
        }
        other => panic!("expected MissingInput, got {other:?}"),
    }
}

#[test]
fn test_empty_tiff_directory_is_empty_input() {
    let fixture = AcquisitionFixture::new();
    fixture.write_channels(CHANNELS_YML, "ch1: DAPI\n");
    let layout = fixture.write_layout("row,1\nA,WT\n");

    let err = parse_acquisition(fixture.root(), &layout, "p", 0, &default_options()).unwrap_err();
    assert!(matches!(err, ParseError::EmptyInput { .. }));
}

#[test]
fn test_duplicate_layout_column_aborts() {
    let fixture = AcquisitionFixture::new();
    fixture.write_channels(CHANNELS_YML, "ch1: DAPI\n");
    let layout = fixture.write_layout("row,3,3\nB,WT,KO\n");
    fixture.write_plane("mip_B03_1.tif", 2, 2, &gradient(0, 2, 2));

    let err = parse_acquisition(fixture.root(), &layout, "p", 0, &default_options()).unwrap_err();
    match err {
        ParseError::DuplicateWell { well } => assert_eq!(well.as_str(), "B03"),
        other => panic!("expected DuplicateWell, got {other:?}"),
    }
}

#[test]
fn test_undecodable_plane_shape_aborts_parse() {
    let fixture = AcquisitionFixture::new();
    fixture.write_channels(CHANNELS_YML, "ch1: DAPI\n");
    let layout = fixture.write_layout("row,1\nA,WT\n");
    fs::write(fixture.tiff_dir().join("mip_A01_1.tif"), b"garbage").unwrap();

    let err = parse_acquisition(fixture.root(), &layout, "p", 0, &default_options()).unwrap_err();
    assert!(matches!(err, ParseError::Decode { .. }));
}

#[test]
fn test_invalid_pixel_size_is_rejected() {
    let fixture = AcquisitionFixture::new();
    let layout = fixture.write_layout("row,1\nA,WT\n");

    let options = default_options().with_pixel_size_um(-0.5);
    let err = parse_acquisition(fixture.root(), &layout, "p", 0, &options).unwrap_err();
    assert!(matches!(err, ParseError::InvalidOptions(_)));
}

#[test]
fn test_empty_plate_name_is_rejected() {
    let fixture = AcquisitionFixture::new();
    let layout = fixture.write_layout("row,1\nA,WT\n");

    let err = parse_acquisition(fixture.root(), &layout, "", 0, &default_options()).unwrap_err();
    assert!(matches!(err, ParseError::InvalidOptions(_)));
}

// =============================================================================
// Multi-Acquisition Parsing
// =============================================================================

#[test]
fn test_parse_acquisitions_concatenates_in_source_order() {
    let fixture_a = AcquisitionFixture::new();
    fixture_a.write_channels(CHANNELS_YML, "ch1: DAPI\n");
    let layout = fixture_a.write_layout("row,1\nA,WT\n");
    fixture_a.write_plane("mip_A01_1.tif", 2, 2, &gradient(0, 2, 2));

    let fixture_b = AcquisitionFixture::new();
    fixture_b.write_channels(CHANNELS_YML, "ch1: DAPI\n");
    fixture_b.write_plane("mip_A01_1.tif", 2, 2, &gradient(9, 2, 2));

    let sources = vec![
        AcquisitionSource {
            path: fixture_a.root().to_path_buf(),
            plate_name: "plate1".to_string(),
            acquisition_id: 0,
        },
        AcquisitionSource {
            path: fixture_b.root().to_path_buf(),
            plate_name: "plate1".to_string(),
            acquisition_id: 1,
        },
    ];

    let images = parse_acquisitions(&sources, &layout, &default_options()).unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].path_builder().acquisition_id, 0);
    assert_eq!(images[1].path_builder().acquisition_id, 1);
}

#[test]
fn test_parse_acquisitions_checks_paths_up_front() {
    let fixture = AcquisitionFixture::new();
    fixture.write_channels(CHANNELS_YML, "ch1: DAPI\n");
    let layout = fixture.write_layout("row,1\nA,WT\n");

    let sources = vec![AcquisitionSource {
        path: fixture.root().join("does-not-exist"),
        plate_name: "plate1".to_string(),
        acquisition_id: 0,
    }];

    let err = parse_acquisitions(&sources, &layout, &default_options()).unwrap_err();
    assert!(matches!(err, ParseError::MissingInput { .. }));
}

#[test]
fn test_parse_acquisitions_missing_layout() {
    let fixture = AcquisitionFixture::new();
    fixture.write_channels(CHANNELS_YML, "ch1: DAPI\n");

    let sources = vec![AcquisitionSource {
        path: fixture.root().to_path_buf(),
        plate_name: "plate1".to_string(),
        acquisition_id: 0,
    }];

    let err = parse_acquisitions(&sources, fixture.root().join("nope.csv").as_path(), &default_options())
        .unwrap_err();
    assert!(matches!(err, ParseError::MissingInput { .. }));
}

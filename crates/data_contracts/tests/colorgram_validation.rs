use data_contracts::colorgram::{ColorgramError, ColorgramRecord};

#[test]
fn parses_region_palettes() {
    let raw = br#"{"1": [[255, 0, 0], [0, 0, 0]], "2": [[10, 20, 30]]}"#;
    let record = ColorgramRecord::from_slice(raw).expect("parse colorgram");
    assert!(record.validate().is_ok());
    assert_eq!(record.region(1), Some(&[[255, 0, 0], [0, 0, 0]][..]));
    assert_eq!(record.region(2), Some(&[[10, 20, 30]][..]));
    assert_eq!(record.region(3), None);
}

#[test]
fn regions_iterate_in_numeric_order() {
    let raw = br#"{"10": [[1, 1, 1]], "2": [[2, 2, 2]], "1": [[3, 3, 3]]}"#;
    let record = ColorgramRecord::from_slice(raw).unwrap();
    let order: Vec<usize> = record
        .indexed_regions()
        .map(|r| r.unwrap().0)
        .collect();
    assert_eq!(order, vec![1, 2, 10]);
}

#[test]
fn non_numeric_region_rejected() {
    let raw = br#"{"top": [[1, 2, 3]]}"#;
    let record = ColorgramRecord::from_slice(raw).unwrap();
    let err = record.validate().unwrap_err();
    assert_eq!(err, ColorgramError::InvalidRegionKey("top".into()));
}

#[test]
fn empty_region_rejected() {
    let raw = br#"{"1": []}"#;
    let record = ColorgramRecord::from_slice(raw).unwrap();
    assert_eq!(record.validate().unwrap_err(), ColorgramError::EmptyRegion(1));
}

#[test]
fn out_of_range_channel_fails_to_parse() {
    let raw = br#"{"1": [[256, 0, 0]]}"#;
    assert!(ColorgramRecord::from_slice(raw).is_err());
}

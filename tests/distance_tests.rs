use transport_catalogue::shared::geo::{Coordinate, Distance};

#[test]
fn distance_test() {
    let zapadnoye = Coordinate {
        latitude: 55.574371,
        longitude: 37.6517,
    };

    let tovarnaya = Coordinate {
        latitude: 55.587655,
        longitude: 37.645687,
    };
    let d = zapadnoye.great_circle_distance(&tovarnaya);
    assert!((d.as_meters() - 1525.0).abs() < 30.0);
    let back = tovarnaya.great_circle_distance(&zapadnoye);
    assert!((d.as_meters() - back.as_meters()).abs() < 1e-6);
}

#[test]
fn distance_sum_test() {
    let total: Distance = [1200u32, 1300, 1500].into_iter().map(Distance::from).sum();
    assert_eq!(total.as_meters(), 4000.0);
}

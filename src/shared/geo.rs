use std::{
    cmp,
    iter::Sum,
    ops::{Add, AddAssign, Div},
};

use serde::{Deserialize, Serialize};

/// Mean earth radius used by the great circle distance.
pub(crate) const EARTH_RADIUS: Distance = Distance::from_meters(6_371_000.0);

#[derive(Debug, Clone, Copy, Default)]
pub struct Distance(f64);

impl PartialEq for Distance {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Distance {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Add for Distance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Distance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0
    }
}

/// Dividing two distances gives a plain ratio.
impl Div for Distance {
    type Output = f64;
    fn div(self, rhs: Self) -> Self::Output {
        self.0 / rhs.0
    }
}

impl Sum for Distance {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Distance::default(), |acc, distance| acc + distance)
    }
}

impl From<u32> for Distance {
    fn from(meters: u32) -> Self {
        Self(meters as f64)
    }
}

impl Distance {
    pub const fn from_meters(distance: f64) -> Self {
        Self(distance)
    }

    pub const fn from_kilometers(distance: f64) -> Self {
        Self(distance * 1000.0)
    }

    pub const fn as_meters(&self) -> f64 {
        self.0
    }

    /// Minutes needed to cover this distance at `velocity_kmh`.
    pub fn travel_minutes(&self, velocity_kmh: f64) -> f64 {
        60.0 * self.0 / (1000.0 * velocity_kmh)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl Coordinate {
    /// Haversine distance over the earth surface.
    pub fn great_circle_distance(&self, coord: &Self) -> Distance {
        if self == coord {
            return Distance::default();
        }
        let (lat_a, lat_b) = (self.latitude.to_radians(), coord.latitude.to_radians());
        let half_lat = (lat_b - lat_a) / 2.0;
        let half_lon = (coord.longitude - self.longitude).to_radians() / 2.0;
        let h = half_lat.sin().powi(2) + lat_a.cos() * lat_b.cos() * half_lon.sin().powi(2);
        let angle = 2.0 * h.sqrt().min(1.0).asin();
        Distance::from_meters(EARTH_RADIUS.as_meters() * angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbouring_stops() {
        let zapadnoye = Coordinate::from((55.574371, 37.6517));
        let universam = Coordinate::from((55.587655, 37.659164));
        let meters = zapadnoye.great_circle_distance(&universam).as_meters();
        assert!((meters - 1550.0).abs() < 30.0, "got {meters}");
    }

    #[test]
    fn same_point() {
        let coord = Coordinate::from((55.574371, 37.6517));
        assert_eq!(coord.great_circle_distance(&coord), Distance::default());
    }

    #[test]
    fn ratio_of_distances() {
        let road = Distance::from(2600u32);
        let straight = Distance::from_kilometers(1.3);
        assert_eq!(road / straight, 2.0);
        assert!(road > straight);
    }

    #[test]
    fn travel_minutes() {
        let minutes = Distance::from_meters(2600.0).travel_minutes(40.0);
        assert!((minutes - 3.9).abs() < 1e-9);
    }
}

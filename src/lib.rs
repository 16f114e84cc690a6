pub mod persistence;
pub mod repository;
pub mod requests;
pub mod router;
pub mod shared;
pub mod stats;

pub mod prelude {
    pub use crate::persistence::Snapshot;
    pub use crate::repository::Repository;
    pub use crate::requests::Document;
    pub use crate::router::{Itinerary, Leg, TransportRouter};
    pub use crate::shared::{Coordinate, Distance, RenderSettings, RoutingSettings};
    pub use crate::stats::{RequestHandler, StatResponse};
}

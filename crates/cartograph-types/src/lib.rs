//! Shared type definitions for Cartograph.
//!
//! This crate is the single source of truth for the plain data records that
//! flow between the exploration scheduler, the waypoint router, the
//! persistence layer, and the HTTP query surface. Types flow downstream to
//! `TypeScript` via `ts-rs` for map and UI front ends.
//!
//! # Modules
//!
//! - [`ids`] -- String-key newtypes for waypoints and roads, UUID scan ids
//! - [`enums`] -- Waypoint, road, resource classification and error kinds
//! - [`structs`] -- Positions, cells, scan records, waypoints, roads, paths

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ErrorKind, ResourceClass, RoadCondition, RoadType, WaypointType};
pub use ids::{RoadId, ScanId, WaypointName};
pub use structs::{
    AreaScanResult, BlockPos, CELL_SHIFT, CELL_SIZE, CellCoordinate, DangerZone, ExplorationTask,
    ExploredArea, NavigationPath, ParseCoordinateError, ResourceLocation, Road, Waypoint,
    polyline_length, travel_seconds,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the shared records.

    #[test]
    fn export_bindings() {
        // The files are written to the `bindings/` directory relative to the
        // crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::WaypointName::export_all();
        let _ = crate::ids::RoadId::export_all();
        let _ = crate::ids::ScanId::export_all();

        // Enums
        let _ = crate::enums::WaypointType::export_all();
        let _ = crate::enums::RoadType::export_all();
        let _ = crate::enums::RoadCondition::export_all();
        let _ = crate::enums::ResourceClass::export_all();
        let _ = crate::enums::ErrorKind::export_all();

        // Structs
        let _ = crate::structs::BlockPos::export_all();
        let _ = crate::structs::ResourceLocation::export_all();
        let _ = crate::structs::ExploredArea::export_all();
        let _ = crate::structs::DangerZone::export_all();
        let _ = crate::structs::ExplorationTask::export_all();
        let _ = crate::structs::AreaScanResult::export_all();
        let _ = crate::structs::Waypoint::export_all();
        let _ = crate::structs::Road::export_all();
        let _ = crate::structs::NavigationPath::export_all();
    }
}

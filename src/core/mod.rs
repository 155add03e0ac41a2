// ─── maven-resource core ───
// Coordinate resolution against a local Maven layout and remote repositories.
//
// Architecture:
//   core/
//     maven/      - Coordinate parser, local repository, resolver, maven:// loader
//     downloader/ - Transport trait + reqwest implementation
//     resource/   - Resource handles, file:// loader, scheme router
//     config.rs   - Immutable resolution settings
//     error.rs    - Crate-wide error type

pub mod config;
pub mod downloader;
pub mod error;
pub mod http;
pub mod maven;
pub mod resource;

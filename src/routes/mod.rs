/// Router Module Index
///
/// Routes are split by how the gateway treats them. The split mirrors the public
/// path set in configuration; the gateway decides by path, not by module.

/// Routes whose paths are in the default public path set, so a presented token is
/// ignored rather than introspected.
pub mod public;

/// Routes behind token authentication. Whether a token is required depends on the
/// configured `AccessPolicy`.
pub mod protected;

/// Opaque per-client key of the web session registry.
pub type SessionId = String;
/// Registry key of a loaded structure.
pub type StructureName = String;

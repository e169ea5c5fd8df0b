pub mod embedding_distance;
pub mod face_analyzer;
pub mod face_matcher;
pub mod reference_signature;

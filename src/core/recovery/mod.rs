//! 헤드 출력으로부터 공통 백본 특징 복원

pub mod least_squares;


pub use least_squares::{
    recover_feature, HeadObservation, HeadReconstruction, LinearSystem, RankPolicy,
    RecoveredFeature, RecoveryConfig, RecoveryDiagnostics, RecoveryEngine, RowBlock, REL_FLOOR,
};

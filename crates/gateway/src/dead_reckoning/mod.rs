mod component;
mod helper;

pub use component::{DeadReckoningComponent, DeadReckoningScene, FlatGround, GroundQuery};
pub use helper::{
    ACCELERATION_VECTOR, ANGULAR_VELOCITY_VECTOR, ARTICULATED_PARAMETERS, DEAD_RECKONING_ALGORITHM,
    DEFAULT_FIXED_SMOOTHING_TIME, DEFAULT_MAX_ROTATION_SMOOTHING_TIME,
    DEFAULT_MAX_TRANSLATION_SMOOTHING_TIME, DeadReckoningAlgorithm, DeadReckoningHelper,
    DeadReckoningOutcome, DirtyFlags, DofStop, FLYING, GROUND_CLAMP_TYPE, GROUND_OFFSET,
    GroundClampType, LAST_KNOWN_ROTATION, LAST_KNOWN_TRANSLATION, UpdateMode, VELOCITY_VECTOR,
    predict_articulation, smooth_articulation,
};

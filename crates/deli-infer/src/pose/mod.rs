mod estimator;
mod postprocess;
mod preprocess;
mod skeleton;
mod types;

pub use estimator::YoloPoseEstimator;
pub use postprocess::{OUTPUT_ROWS, postprocess};
pub use preprocess::{TARGET_SIZE, preprocess};
pub use skeleton::{Connection, ConnectionTable};
pub use types::{BODY_PART_COUNT, BodyPart, Keypoint, LetterboxInfo, Pose};

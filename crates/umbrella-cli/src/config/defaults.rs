use umbrella::core::mdp::{DEFAULT_GROUP1_NAME, DEFAULT_GROUP2_NAME, DEFAULT_SPRING_CONSTANT};
use umbrella::engine::config::{
    DEFAULT_GMX_EXECUTABLE, DEFAULT_INPUT_DIR, DEFAULT_MAX_DISTANCE, DEFAULT_MIN_DISTANCE,
    DEFAULT_WINDOWS,
};

pub struct DefaultsConfig {
    pub windows: usize,
    pub min_distance: f64,
    pub max_distance: f64,
    pub group1_name: String,
    pub group2_name: String,
    pub spring_constant: f64,
    pub input_dir: String,
    pub output_dir: String,
    pub gmx_executable: String,
    pub production: bool,
    pub parallel: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            windows: DEFAULT_WINDOWS,
            min_distance: DEFAULT_MIN_DISTANCE,
            max_distance: DEFAULT_MAX_DISTANCE,
            group1_name: DEFAULT_GROUP1_NAME.to_string(),
            group2_name: DEFAULT_GROUP2_NAME.to_string(),
            spring_constant: DEFAULT_SPRING_CONSTANT,
            input_dir: DEFAULT_INPUT_DIR.to_string(),
            output_dir: ".".to_string(),
            gmx_executable: DEFAULT_GMX_EXECUTABLE.to_string(),
            production: false,
            parallel: false,
        }
    }
}

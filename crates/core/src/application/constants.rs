// Driver constants (no magic values in the resolution/synthesis code)

/// Environment variable advertising the machine to CIME
pub const CIME_MACHINE_ENV: &str = "CIME_MACHINE";

/// Default work dir, relative to the root dir
pub const DEFAULT_WORK_DIR_NAME: &str = "ctest-build-scripts";

/// ctest driver script, relative to the root dir
pub const CTEST_SCRIPT_PATH: &str = "cmake/ctest_script_scripts_tests.cmake";

/// Trailing path segments a supplied root dir must end with
pub const EXPECTED_ROOT_SEGMENTS: [&str; 2] = ["components", "scream"];

/// Parallelism fixed to a single track
pub const CTEST_PARALLEL_LEVEL_ENV: &str = "CTEST_PARALLEL_LEVEL";
pub const CTEST_PARALLEL_LEVEL: &str = "1";

pub const CTEST_PROGRAM: &str = "ctest";

/// Strict single-job, verbose, output-on-failure
pub const CTEST_BASE_ARGS: [&str; 3] = ["-j1", "-V", "--output-on-failure"];

/// Define names understood by the ctest script
pub const NO_SUBMIT_DEFINE: &str = "NO_SUBMIT";
pub const SCREAM_ROOT_DEFINE: &str = "SCREAM_ROOT";
pub const BUILD_WORK_DIR_DEFINE: &str = "BUILD_WORK_DIR";

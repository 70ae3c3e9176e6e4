//! Merge rules: defaults, override order, conflict handling.
//!
//! Sources are layered lowest to highest: these defaults, the global file, the
//! workspace files, then `IDLSYNC__*` environment variables.

use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("project.source_dir", "src/main/thrift")?
        .set_default("project.output_dir", "target/generated/thrift")?
        .set_default("project.external_include_dir", "target/thrift-external")?
        .set_default("project.idl_extension", "thrift")?
        .set_default("project.generated_extension", "java")?
        .set_default("project.prune_stale", true)?
        .set_default("compiler.binary", "thrift")?
        .set_default("compiler.include_flag", "-I")?
        .set_default("compiler.output_flag", "-o")?
        .set_default("compiler.timeout_secs", 0_i64)
}

/// Environment overrides: `IDLSYNC__COMPILER__BINARY=scrooge` sets `compiler.binary`.
pub fn add_env_overrides(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("IDLSYNC")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}

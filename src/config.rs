use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Bucket used when neither `--bucket` nor `S3_BUCKET` is given
pub const DEFAULT_BUCKET: &str = "secure-static-site-aws";

/// Site directory used when neither `--dir` nor `SITE_DIR` is given
pub const DEFAULT_SITE_DIR: &str = "./website";

/// Configuration for a site deployment
#[derive(Debug, Clone)]
pub struct Config {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub bucket: String,
    pub site_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// `.env` is loaded once at startup by the binary, before logging is set up.
    /// Every value is optional. Region and profile fall back to the AWS SDK's
    /// default provider chain, bucket and site directory to the compiled-in
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::new(
            lookup("AWS_REGION"),
            lookup("AWS_PROFILE"),
            lookup("S3_BUCKET"),
            lookup("SITE_DIR").map(PathBuf::from),
        )
    }

    /// Build a validated configuration, filling gaps with the defaults
    pub fn new(
        region: Option<String>,
        profile: Option<String>,
        bucket: Option<String>,
        site_dir: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(region) = &region {
            Self::validate_region(region)?;
        }

        let bucket = bucket.unwrap_or_else(|| DEFAULT_BUCKET.to_string());
        Self::validate_bucket_name(&bucket)
            .with_context(|| format!("Invalid bucket configuration: {}", bucket))?;

        let site_dir = site_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_SITE_DIR));

        Ok(Self {
            region,
            profile,
            bucket,
            site_dir,
        })
    }

    /// Apply command line overrides on top of the loaded configuration
    pub fn with_overrides(
        mut self,
        bucket: Option<String>,
        site_dir: Option<PathBuf>,
    ) -> Result<Self> {
        if let Some(bucket) = bucket {
            Self::validate_bucket_name(&bucket)?;
            self.bucket = bucket;
        }
        if let Some(site_dir) = site_dir {
            self.site_dir = site_dir;
        }
        Ok(self)
    }

    /// Validate AWS region format
    fn validate_region(region: &str) -> Result<()> {
        if region.is_empty() {
            anyhow::bail!("AWS_REGION cannot be empty");
        }

        // Basic validation - ensure it looks like a region (contains a dash)
        if !region.contains('-') {
            anyhow::bail!(
                "AWS_REGION '{}' doesn't look like a valid region (e.g., us-west-2, eu-west-1)",
                region
            );
        }

        Ok(())
    }

    /// Validate S3 bucket name according to AWS rules
    fn validate_bucket_name(bucket: &str) -> Result<()> {
        if bucket.len() < 3 || bucket.len() > 63 {
            anyhow::bail!(
                "S3 bucket '{}' must be between 3 and 63 characters (got {})",
                bucket,
                bucket.len()
            );
        }

        let is_edge_char = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
        if !bucket.starts_with(is_edge_char) || !bucket.ends_with(is_edge_char) {
            anyhow::bail!(
                "S3 bucket '{}' must start and end with a lowercase letter or number",
                bucket
            );
        }

        if let Some(c) = bucket
            .chars()
            .find(|c| !c.is_ascii_lowercase() && !c.is_ascii_digit() && *c != '-' && *c != '.')
        {
            anyhow::bail!(
                "S3 bucket '{}' contains invalid character '{}'. Only lowercase letters, numbers, hyphens, and periods are allowed",
                bucket,
                c
            );
        }

        if bucket.contains("..") {
            anyhow::bail!("S3 bucket '{}' cannot contain consecutive periods", bucket);
        }

        // Check for IP address format (not allowed)
        if bucket.split('.').count() == 4
            && bucket.split('.').all(|part| part.parse::<u8>().is_ok())
        {
            anyhow::bail!("S3 bucket '{}' cannot be formatted as an IP address", bucket);
        }

        Ok(())
    }
}

//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - parsed from a TOML config file or CLI flags
//! - passed to the numeric routines
//! - echoed back in JSON run summaries

use clap::ValueEnum;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// How background spectra are orthogonalized against the polynomial baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundFit {
    /// Asymmetric least squares with the run's asymmetry factor.
    Asymmetric,
    /// Plain least squares projection (asymmetry factor 0.5).
    Symmetric,
}

/// Optional background reference spectra for EMSC.
///
/// The matrix is `m × q`: one row per wavelength variable, one column per
/// background spectrum.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Background {
    #[default]
    None,
    Spectra(DMatrix<f64>),
}

impl Background {
    pub fn spectra(&self) -> Option<&DMatrix<f64>> {
        match self {
            Background::None => None,
            Background::Spectra(m) => Some(m),
        }
    }

    /// Number of background columns contributed to the regressor.
    pub fn n_terms(&self) -> usize {
        self.spectra().map_or(0, |m| m.ncols())
    }
}

/// EMSC settings as they appear in config files and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmscSettings {
    /// Highest polynomial order of the baseline.
    pub p_order: usize,
    /// Divide each pretreated sample by its chemical-information coefficient.
    pub normalize: bool,
    /// ALS asymmetry factor, in (0, 1).
    pub asym_factor: f64,
    /// ALS iteration cap per response column.
    pub max_iter: usize,
    pub background_fit: BackgroundFit,
}

impl Default for EmscSettings {
    fn default() -> Self {
        Self {
            p_order: 2,
            normalize: false,
            asym_factor: 0.1,
            max_iter: 10,
            background_fit: BackgroundFit::Asymmetric,
        }
    }
}

/// Whittaker smoother settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WhittakerSettings {
    pub penalty: f64,
    pub constraint_order: usize,
}

impl Default for WhittakerSettings {
    fn default() -> Self {
        Self {
            penalty: 100.0,
            constraint_order: 2,
        }
    }
}

/// Top-level configuration file.
///
/// ```toml
/// [emsc]
/// p_order = 1
/// normalize = true
///
/// [whittaker]
/// penalty = 1e4
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PretreatConfig {
    pub emsc: EmscSettings,
    pub whittaker: WhittakerSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_term_count() {
        assert_eq!(Background::None.n_terms(), 0);
        let bg = Background::Spectra(DMatrix::zeros(50, 2));
        assert_eq!(bg.n_terms(), 2);
        assert!(bg.spectra().is_some());
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let cfg: PretreatConfig = toml::from_str(
            r#"
            [emsc]
            p_order = 0
            background_fit = "symmetric"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.emsc.p_order, 0);
        assert_eq!(cfg.emsc.background_fit, BackgroundFit::Symmetric);
        assert_eq!(cfg.emsc.max_iter, 10);
        assert_eq!(cfg.whittaker, WhittakerSettings::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed: Result<PretreatConfig, _> = toml::from_str("[emsc]\norder = 3\n");
        assert!(parsed.is_err());
    }
}

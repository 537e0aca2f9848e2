use crate::{Error, Matrix3};

fn default_skin() -> f64 {
    0.01
}

/// Parameters shared by all neighbor list builders.
///
/// This can be created in code with [`NeighborOptions::new`], or from a JSON
/// string with [`NeighborOptions::from_json`]:
///
/// ```
/// # use pbc_neighbors::NeighborOptions;
/// let options = NeighborOptions::from_json(r#"{"cutoff": 3.2, "skin": 0.0}"#).unwrap();
/// assert_eq!(options.cutoff, 3.2);
/// assert_eq!(options.parallel, false);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NeighborOptions {
    /// Radius of the spherical cutoff used to select neighbors
    pub cutoff: f64,
    /// Tolerance added to the cutoff. The dense builder includes pairs with
    /// `distance < cutoff + skin`, while the one-way builders include pairs
    /// with `distance² < cutoff² + skin`.
    #[serde(default = "default_skin")]
    pub skin: f64,
    /// Strain applied to both the cell and the positions before any other
    /// operation, as `(I + strain) · v` for every lattice vector and position
    /// `v`. Defaults to zero, i.e. no deformation.
    #[serde(default)]
    pub strain: [[f64; 3]; 3],
    /// Fill the dense distance tensor in parallel over atoms
    #[serde(default)]
    pub parallel: bool,
}

impl NeighborOptions {
    /// Create options with the given `cutoff` and default values for
    /// everything else
    pub fn new(cutoff: f64) -> NeighborOptions {
        NeighborOptions {
            cutoff: cutoff,
            skin: default_skin(),
            strain: [[0.0; 3]; 3],
            parallel: false,
        }
    }

    /// Parse and validate options from a JSON string
    pub fn from_json(json: &str) -> Result<NeighborOptions, Error> {
        let options = serde_json::from_str::<NeighborOptions>(json)?;
        options.validate()?;
        return Ok(options);
    }

    /// Check that these options can be used to build a neighbor list
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.cutoff >= 0.0 && self.cutoff.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "cutoff must be a non-negative finite number, got {}", self.cutoff
            )));
        }

        if !(self.skin >= 0.0 && self.skin.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "skin must be a non-negative finite number, got {}", self.skin
            )));
        }

        if !Matrix3::from(self.strain).is_finite() {
            return Err(Error::InvalidParameter(format!(
                "strain contains non-finite values: {:?}", self.strain
            )));
        }

        return Ok(());
    }

    /// Get the full deformation tensor `I + strain`
    pub fn strain_tensor(&self) -> Matrix3 {
        Matrix3::one() + Matrix3::from(self.strain)
    }

    /// Radius used by the dense builder: pairs with a distance strictly below
    /// this value are included
    pub fn effective_cutoff(&self) -> f64 {
        self.cutoff + self.skin
    }

    /// Squared radius used by the one-way builders: pairs with a squared
    /// distance strictly below this value are included
    pub fn oneway_cutoff2(&self) -> f64 {
        self.cutoff * self.cutoff + self.skin
    }
}

//! Simulated radar reflectivity.
//!
//! Equivalent radar reflectivity factor from model pressure, temperature
//! and hydrometeor mixing ratios, assuming exponential size distributions
//! with fixed intercept parameters (the classic RIP formulation). Snow and
//! graupel contributions are included when the file carries `QSNOW` /
//! `QGRAUP`; microphysics schemes without those species contribute zero.

use std::f64::consts::PI;

use crate::grid::Field3D;
use crate::io::{WrfError, WrfFile};

use super::thermo::{self, RD};

/// Density of liquid water (kg m-3).
const RHO_WATER: f64 = 1000.0;
/// Density of snow (kg m-3).
const RHO_SNOW: f64 = 100.0;
/// Density of graupel (kg m-3).
const RHO_GRAUPEL: f64 = 400.0;
/// Rain size-distribution intercept (m-4).
const N0_RAIN: f64 = 8.0e6;
/// Snow size-distribution intercept (m-4).
const N0_SNOW: f64 = 2.0e7;
/// Graupel size-distribution intercept (m-4).
const N0_GRAUPEL: f64 = 4.0e6;
/// Gamma(7), for the sixth-moment integral.
const GAMMA_SEVEN: f64 = 720.0;
/// Dielectric reduction factor for ice vs liquid water.
const ALPHA_ICE: f64 = 0.224;
/// Ratio of gas constants for dry air and water vapor.
const EPS: f64 = 0.622;

/// Simulated radar reflectivity (dBZ) on mass levels.
pub fn reflectivity(file: &WrfFile) -> Result<Field3D, WrfError> {
    let tk = thermo::temperature(file)?;
    let p = file.var_3d("P")?;
    let pb = file.var_3d("PB")?;
    let qv = file.var_3d("QVAPOR")?;
    let qr = file.var_3d("QRAIN")?;
    let qs = optional_3d(file, "QSNOW", tk.nz(), tk.ny(), tk.nx())?;
    let qg = optional_3d(file, "QGRAUP", tk.nz(), tk.ny(), tk.nx())?;

    // Sixth-moment prefactors; 1e18 converts m^6 m^-3 to mm^6 m^-3.
    let factor_r = GAMMA_SEVEN * 1.0e18 * (1.0 / (PI * RHO_WATER * N0_RAIN)).powf(1.75);
    let factor_s = GAMMA_SEVEN
        * 1.0e18
        * (1.0 / (PI * RHO_SNOW * N0_SNOW)).powf(1.75)
        * (RHO_SNOW / RHO_WATER).powi(2)
        * ALPHA_ICE;
    let factor_g = GAMMA_SEVEN
        * 1.0e18
        * (1.0 / (PI * RHO_GRAUPEL * N0_GRAUPEL)).powf(1.75)
        * (RHO_GRAUPEL / RHO_WATER).powi(2)
        * ALPHA_ICE;

    let (nz, ny, nx) = (tk.nz(), tk.ny(), tk.nx());
    let mut data = vec![vec![vec![0.0f32; nx]; ny]; nz];

    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                let t = tk.data[k][j][i] as f64;
                let pres = p[k][j][i] as f64 + pb[k][j][i] as f64;
                let qvp = (qv[k][j][i] as f64).max(0.0);
                let qra = (qr[k][j][i] as f64).max(0.0);
                let qsn = (qs[k][j][i] as f64).max(0.0);
                let qgr = (qg[k][j][i] as f64).max(0.0);

                let t_virtual = t * (EPS + qvp) / (EPS * (1.0 + qvp));
                let rho_air = pres / (RD * t_virtual);

                let z_e = factor_r * (rho_air * qra).powf(1.75)
                    + factor_s * (rho_air * qsn).powf(1.75)
                    + factor_g * (rho_air * qgr).powf(1.75);

                data[k][j][i] = (10.0 * z_e.max(0.001).log10()) as f32;
            }
        }
    }

    Ok(Field3D::new("dbz", "dBZ", data, tk.coords))
}

/// Read a 3D mixing ratio, substituting zeros when the variable is absent.
fn optional_3d(
    file: &WrfFile,
    name: &str,
    nz: usize,
    ny: usize,
    nx: usize,
) -> Result<Vec<Vec<Vec<f32>>>, WrfError> {
    match file.var_3d(name) {
        Ok(data) => Ok(data),
        Err(WrfError::MissingVariable(_)) => Ok(vec![vec![vec![0.0f32; nx]; ny]; nz]),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference computation for a single rain-only point.
    fn dbz_rain_point(tk: f64, pres: f64, qvp: f64, qra: f64) -> f64 {
        let factor_r = GAMMA_SEVEN * 1.0e18 * (1.0 / (PI * RHO_WATER * N0_RAIN)).powf(1.75);
        let t_virtual = tk * (EPS + qvp) / (EPS * (1.0 + qvp));
        let rho_air = pres / (RD * t_virtual);
        10.0 * (factor_r * (rho_air * qra).powf(1.75)).max(0.001).log10()
    }

    #[test]
    fn test_no_hydrometeors_is_noise_floor() {
        // z_e floors at 0.001 mm^6 m^-3, i.e. -30 dBZ
        let dbz = dbz_rain_point(280.0, 90_000.0, 0.005, 0.0);
        assert!((dbz - (-30.0)).abs() < 1e-9, "clear air dBZ: {dbz}");
    }

    #[test]
    fn test_rain_reflectivity_plausible() {
        // ~1 g/kg rain near the surface lands in the convective range
        let dbz = dbz_rain_point(290.0, 95_000.0, 0.01, 0.001);
        assert!(dbz > 30.0 && dbz < 60.0, "1 g/kg rain dBZ: {dbz}");
    }

    #[test]
    fn test_more_rain_more_dbz() {
        let light = dbz_rain_point(285.0, 95_000.0, 0.008, 0.0002);
        let heavy = dbz_rain_point(285.0, 95_000.0, 0.008, 0.004);
        assert!(heavy > light);
    }
}

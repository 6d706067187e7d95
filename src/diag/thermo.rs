//! Temperature and moisture diagnostics.
//!
//! WRF stores perturbation potential temperature and split pressure, so
//! actual temperature is derived via the Poisson relation; 2 m dewpoint is
//! derived from surface pressure and the 2 m water-vapor mixing ratio.

use crate::grid::{Field2D, Field3D};
use crate::io::{WrfError, WrfFile};

use super::horizontal_coords;

/// Dry-air gas constant (J kg-1 K-1).
pub(crate) const RD: f64 = 287.04;
/// Specific heat of dry air at constant pressure (J kg-1 K-1).
pub(crate) const CP: f64 = 1004.0;
/// Reference pressure for potential temperature (Pa).
const P1000MB: f64 = 100_000.0;
/// Offset of WRF's perturbation potential temperature (K).
const T_BASE: f64 = 300.0;

/// 2 m temperature (`T2`, K).
pub fn temperature_2m(file: &WrfFile) -> Result<Field2D, WrfError> {
    let data = file.var_2d("T2")?;
    let coords = horizontal_coords(file, data.len(), data[0].len())?;
    Ok(Field2D::new("T2", "K", data, coords))
}

/// 3D temperature (K) from perturbation potential temperature and
/// pressure: `tk = (T + 300) * (p / p0)^(Rd/cp)`.
pub fn temperature(file: &WrfFile) -> Result<Field3D, WrfError> {
    let theta_pert = file.var_3d("T")?;
    let p = file.var_3d("P")?;
    let pb = file.var_3d("PB")?;

    let exponent = RD / CP;
    let data: Vec<Vec<Vec<f32>>> = theta_pert
        .iter()
        .zip(p.iter().zip(pb.iter()))
        .map(|(tk_lvl, (p_lvl, pb_lvl))| {
            tk_lvl
                .iter()
                .zip(p_lvl.iter().zip(pb_lvl.iter()))
                .map(|(t_row, (p_row, pb_row))| {
                    t_row
                        .iter()
                        .zip(p_row.iter().zip(pb_row.iter()))
                        .map(|(&t, (&pp, &pbb))| {
                            let theta = t as f64 + T_BASE;
                            let pres = pp as f64 + pbb as f64;
                            (theta * (pres / P1000MB).powf(exponent)) as f32
                        })
                        .collect()
                })
                .collect()
        })
        .collect();

    let coords = horizontal_coords(file, data[0].len(), data[0][0].len())?;
    Ok(Field3D::new("tk", "K", data, coords))
}

/// 2 m dewpoint temperature (°C) from `Q2` and `PSFC`.
///
/// Vapor pressure `e = p * qv / (eps + qv)` inverted through the Bolton
/// saturation formula. Dry points (vanishing vapor pressure) come out NaN.
pub fn dewpoint_2m(file: &WrfFile) -> Result<Field2D, WrfError> {
    let q2 = file.var_2d("Q2")?;
    let psfc = file.var_2d("PSFC")?;

    let data: Vec<Vec<f32>> = q2
        .iter()
        .zip(psfc.iter())
        .map(|(q_row, p_row)| {
            q_row
                .iter()
                .zip(p_row.iter())
                .map(|(&q, &p)| dewpoint_from_q_p(q as f64, p as f64) as f32)
                .collect()
        })
        .collect();

    let coords = horizontal_coords(file, data.len(), data[0].len())?;
    Ok(Field2D::new("td2", "degC", data, coords))
}

/// Dewpoint (°C) from mixing ratio (kg/kg) and pressure (Pa).
fn dewpoint_from_q_p(qv: f64, p: f64) -> f64 {
    let qv = qv.max(0.0);
    let p_hpa = p * 0.01;
    let e = p_hpa * qv / (0.622 + qv);
    if e <= 0.0 {
        return f64::NAN;
    }
    let le = (e / 6.112).ln();
    243.5 * le / (17.67 - le)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dewpoint_saturated_at_zero_celsius() {
        // e = 6.112 hPa is saturation at 0 degC, so Td must be 0
        // Solve qv from e: qv = 0.622 e / (p_hpa - e)
        let p = 100_000.0;
        let e = 6.112;
        let qv = 0.622 * e / (p * 0.01 - e);
        let td = dewpoint_from_q_p(qv, p);
        assert!(td.abs() < 1e-9, "Td at saturation pressure 6.112 hPa: {td}");
    }

    #[test]
    fn test_dewpoint_monotonic_in_moisture() {
        let p = 95_000.0;
        let dry = dewpoint_from_q_p(0.004, p);
        let moist = dewpoint_from_q_p(0.012, p);
        assert!(moist > dry, "dewpoint must rise with mixing ratio");
    }

    #[test]
    fn test_dewpoint_dry_point_is_nan() {
        assert!(dewpoint_from_q_p(0.0, 100_000.0).is_nan());
        assert!(dewpoint_from_q_p(-0.001, 100_000.0).is_nan());
    }

    #[test]
    fn test_poisson_exponent_reference() {
        // theta = 300 K at exactly 1000 hPa gives tk = 300 K
        let theta: f64 = 300.0;
        let tk = theta * (100_000.0f64 / 100_000.0).powf(RD / CP);
        assert!((tk - 300.0).abs() < 1e-12);
    }
}

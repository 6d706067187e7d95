//! Wind diagnostics.
//!
//! WRF winds are grid-relative and staggered. These functions destagger
//! them onto mass points and rotate to true east/north components using the
//! `SINALPHA`/`COSALPHA` arrays; idealized runs without those arrays get
//! the identity rotation.

use crate::grid::{Field2D, Field3D};
use crate::io::{WrfError, WrfFile};

use super::{destagger_x, destagger_y, destagger_z, horizontal_coords};

/// 10 m wind components rotated to earth coordinates (m s-1).
///
/// Returns `(u, v)` with eastward and northward orientation.
pub fn wind_10m(file: &WrfFile) -> Result<(Field2D, Field2D), WrfError> {
    let u10 = file.var_2d("U10")?;
    let v10 = file.var_2d("V10")?;
    let (ny, nx) = (u10.len(), u10[0].len());

    let (u, v) = match file.rotation()? {
        Some((sina, cosa)) => rotate_2d(&u10, &v10, &sina, &cosa),
        None => (u10, v10),
    };

    let coords = horizontal_coords(file, ny, nx)?;
    Ok((
        Field2D::new("uvmet10_u", "m s-1", u, coords.clone()),
        Field2D::new("uvmet10_v", "m s-1", v, coords),
    ))
}

/// 3D wind components on mass points, rotated to earth coordinates
/// (m s-1).
pub fn wind(file: &WrfFile) -> Result<(Field3D, Field3D), WrfError> {
    let u_stag = file.var_3d("U")?;
    let v_stag = file.var_3d("V")?;

    let u = destagger_x(&u_stag);
    let v = destagger_y(&v_stag);

    let (u, v) = match file.rotation()? {
        Some((sina, cosa)) => {
            let mut u_rot = Vec::with_capacity(u.len());
            let mut v_rot = Vec::with_capacity(v.len());
            for (u_lvl, v_lvl) in u.iter().zip(v.iter()) {
                let (ur, vr) = rotate_2d(u_lvl, v_lvl, &sina, &cosa);
                u_rot.push(ur);
                v_rot.push(vr);
            }
            (u_rot, v_rot)
        }
        None => (u, v),
    };

    let coords = horizontal_coords(file, u[0].len(), u[0][0].len())?;
    Ok((
        Field3D::new("uvmet_u", "m s-1", u, coords.clone()),
        Field3D::new("uvmet_v", "m s-1", v, coords),
    ))
}

/// Vertical velocity on mass levels (`W` destaggered, m s-1).
pub fn vertical_velocity(file: &WrfFile) -> Result<Field3D, WrfError> {
    let w_stag = file.var_3d("W")?;
    let data = destagger_z(&w_stag);
    let coords = horizontal_coords(file, data[0].len(), data[0][0].len())?;
    Ok(Field3D::new("wa", "m s-1", data, coords))
}

/// Wind speed: Euclidean norm of two component fields at every point.
///
/// # Panics
///
/// Panics if the component shapes differ.
pub fn wind_speed(u: &Field2D, v: &Field2D) -> Field2D {
    assert_eq!(
        (u.ny(), u.nx()),
        (v.ny(), v.nx()),
        "wind component shape mismatch"
    );

    let data: Vec<Vec<f32>> = u
        .data
        .iter()
        .zip(v.data.iter())
        .map(|(u_row, v_row)| {
            u_row
                .iter()
                .zip(v_row.iter())
                .map(|(&a, &b)| (a * a + b * b).sqrt())
                .collect()
        })
        .collect();

    Field2D::new("wspd", u.units.clone(), data, u.coords.clone())
}

/// Rotate grid-relative components to earth-relative:
/// `u_e = u cosα - v sinα`, `v_e = v cosα + u sinα`.
fn rotate_2d(
    u: &[Vec<f32>],
    v: &[Vec<f32>],
    sina: &[Vec<f32>],
    cosa: &[Vec<f32>],
) -> (Vec<Vec<f32>>, Vec<Vec<f32>>) {
    let ny = u.len();
    let nx = u[0].len();
    let mut ue = vec![vec![0.0f32; nx]; ny];
    let mut ve = vec![vec![0.0f32; nx]; ny];

    for j in 0..ny {
        for i in 0..nx {
            let (uu, vv) = (u[j][i], v[j][i]);
            let (s, c) = (sina[j][i], cosa[j][i]);
            ue[j][i] = uu * c - vv * s;
            ve[j][i] = vv * c + uu * s;
        }
    }
    (ue, ve)
}

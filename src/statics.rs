use crate::entities::FrameValue;

const FLOOR_COLOR: [u8; 3] = [144, 181, 198];
const FORCE_PLATE_COLOR: [u8; 3] = [44, 115, 148];
const GRAVITY_COLOR: [u8; 3] = [255, 255, 255];

/// Gravity arrows are shortened by this factor so a 9.81 m/s^2 vector does
/// not dwarf the scene.
const GRAVITY_DISPLAY_SCALE: f64 = 20.0;

/// Scenery rendered once at a phase's first instant and left in place until
/// the phase is cleared.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct StaticComponent {
    pub name: String,
    pub value: FrameValue,
}

/// A square wireframe floor grid centered on the origin.
///
/// `square_width` is the half-width in meters; the grid spans
/// `[-square_width, square_width]` on both axes with `subsquares`
/// subdivisions per side.
pub fn floor(name: &str, square_width: f64, height_offset: f64, subsquares: usize) -> StaticComponent {
    let lines = subsquares + 1;
    let step = 2.0 * square_width / subsquares.max(1) as f64;
    let mut strips = Vec::with_capacity(2 * lines);
    for i in 0..lines {
        let offset = -square_width + step * i as f64;
        strips.push(vec![
            [-square_width, offset, height_offset],
            [square_width, offset, height_offset],
        ]);
        strips.push(vec![
            [offset, -square_width, height_offset],
            [offset, square_width, height_offset],
        ]);
    }
    let count = strips.len();
    StaticComponent {
        name: format!("{name}/floor"),
        value: FrameValue::Strips {
            strips,
            radii: vec![0.002; count],
            colors: vec![FLOOR_COLOR; count],
        },
    }
}

/// The gravity field as a single arrow anchored at the origin.
pub fn gravity(name: &str, vector: [f64; 3]) -> StaticComponent {
    StaticComponent {
        name: format!("{name}/gravity"),
        value: FrameValue::Arrows {
            origins: vec![[0.0, 0.0, 0.0]],
            vectors: vec![[
                vector[0] / GRAVITY_DISPLAY_SCALE,
                vector[1] / GRAVITY_DISPLAY_SCALE,
                vector[2] / GRAVITY_DISPLAY_SCALE,
            ]],
            color: GRAVITY_COLOR,
        },
    }
}

/// A force-plate outline drawn as one closed strip through its corners.
pub fn force_plate(name: &str, plate: usize, corners: [[f64; 3]; 4]) -> StaticComponent {
    let mut outline: Vec<[f64; 3]> = corners.to_vec();
    outline.push(corners[0]);
    StaticComponent {
        name: format!("{name}/force_plate_{plate}"),
        value: FrameValue::Strips {
            strips: vec![outline],
            radii: vec![0.004],
            colors: vec![FORCE_PLATE_COLOR],
        },
    }
}

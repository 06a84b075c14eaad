use glam::{Vec2, vec2};

/// Eye height at which the horizon cuts walls in half.
pub const DEFAULT_EYE_HEIGHT: f32 = 1.0;

/// Upper bound for the eye; 2 puts it at the ceiling.
pub const MAX_EYE_HEIGHT: f32 = 2.0;

/// Viewer pose in grid-local units (world / tile size).
///
/// * Only **yaw** rotates the view; pitch is faked by shifting the horizon
///   `tilt` pixels.
/// * The map is y-down, so positive yaw turns clockwise on screen and the
///   camera plane (`forward().perp()`) points to the viewer's right.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub pos: Vec2,
    yaw: f32, // radians (0 = +X, clockwise on a y-down map)
    fov: f32, // horizontal FoV (radians)
    dir: Vec2,
    plane: Vec2,
    eye_height: f32,
    pub tilt: f32, // horizon offset in pixels (+ = look down)
}

impl Camera {
    /// Create a new camera at `pos`, facing `yaw`, with horizontal FoV `fov`.
    pub fn new(pos: Vec2, yaw: f32, fov: f32) -> Self {
        let mut cam = Self {
            pos,
            yaw: 0.0,
            fov,
            dir: Vec2::X,
            plane: Vec2::Y,
            eye_height: DEFAULT_EYE_HEIGHT,
            tilt: 0.0,
        };
        cam.set_yaw(yaw);
        cam
    }

    /// Build directly from a looking direction; `dir` need not be unit length.
    pub fn looking_at(pos: Vec2, dir: Vec2, fov: f32) -> Self {
        let yaw = dir.y.atan2(dir.x);
        Self::new(pos, yaw, fov)
    }

    #[inline]
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Unit vector pointing where the camera looks.
    #[inline(always)]
    pub fn forward(&self) -> Vec2 {
        self.dir
    }

    /// Camera plane: `forward` rotated a quarter turn, scaled by `tan(fov/2)`.
    #[inline(always)]
    pub fn plane(&self) -> Vec2 {
        self.plane
    }

    #[inline]
    pub fn eye_height(&self) -> f32 {
        self.eye_height
    }

    /// Eye height in `[0, 2]`; 0 = floor, 1 = default, 2 = ceiling.
    pub fn set_eye_height(&mut self, h: f32) {
        self.eye_height = h.clamp(0.0, MAX_EYE_HEIGHT);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw.rem_euclid(std::f32::consts::TAU);
        let (s, c) = self.yaw.sin_cos();
        self.dir = vec2(c, s);
        self.plane = self.dir.perp() * (self.fov * 0.5).tan();
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
        self.set_yaw(self.yaw);
    }

    /// Ray direction through screen column `x` of a `w`-wide screen.
    #[inline]
    pub fn column_ray(&self, x: usize, w: usize) -> Vec2 {
        let camera_x = 2.0 * x as f32 / w as f32 - 1.0;
        self.dir + self.plane * camera_x
    }

    /// Transform a local-space point into camera space by inverting the
    /// `[plane, dir]` matrix:
    ///  .x = lateral offset in camera-plane units (+ right)
    ///  .y = depth along `forward`
    ///
    /// `None` when the matrix is singular (zero FoV).
    #[inline]
    pub fn to_cam(&self, p: Vec2) -> Option<Vec2> {
        let rel = p - self.pos;
        let det = self.plane.x * self.dir.y - self.dir.x * self.plane.y;
        if det == 0.0 {
            return None;
        }
        let inv_det = 1.0 / det;
        Some(vec2(
            inv_det * (self.dir.y * rel.x - self.dir.x * rel.y),
            inv_det * (-self.plane.y * rel.x + self.plane.x * rel.y),
        ))
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Move by `forward` units and `side` (strafe, + right).
    pub fn step(&mut self, forward: f32, side: f32) {
        self.pos += self.dir * forward + self.dir.perp() * side;
    }

    /// Rotate (positive = clockwise on the y-down map).
    pub fn turn(&mut self, delta_yaw: f32) {
        self.set_yaw(self.yaw + delta_yaw);
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/

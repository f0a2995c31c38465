use anyhow::Result;
use glam::{Mat4, Vec3};
use std::convert::Infallible;
use tracing::{debug, info, warn};
use vrcam_config::AppConfig;
use vrcam_imu::{RawImuSample, SensorFusionAdapter, GRAVITY};
use vrcam_renderer::{DisplaySize, Eye, EyeCamera, EyeRenderer, StereoCamera, StereoCompositor};

/// Frames simulated by the demo loop (five seconds at 60 Hz).
const FRAME_COUNT: u32 = 300;
const FRAME_DT: f32 = 1.0 / 60.0;

/// What the demo renderer "draws": the matrices an engine would upload.
#[derive(Debug, Clone, Copy)]
struct EyeImage {
    eye: Eye,
    combined: Mat4,
}

/// Stand-in for a scene renderer; records the transform it was given.
struct TraceRenderer;

impl EyeRenderer for TraceRenderer {
    type Image = EyeImage;
    type Error = Infallible;

    fn render_eye(&mut self, eye: Eye, camera: &EyeCamera) -> Result<EyeImage, Infallible> {
        Ok(EyeImage {
            eye,
            combined: camera.combined_matrix(),
        })
    }
}

/// Composites into memory instead of a swapchain.
#[derive(Default)]
struct MemoryCompositor {
    bound: Option<Eye>,
    frames: u64,
    last: Option<(EyeImage, EyeImage)>,
}

impl StereoCompositor for MemoryCompositor {
    type Image = EyeImage;
    type Target = Eye;

    fn acquire(&mut self, eye: Eye, _size: DisplaySize) -> Eye {
        self.bound = Some(eye);
        eye
    }

    fn release(&mut self, target: Eye) {
        if self.bound == Some(target) {
            self.bound = None;
        }
    }

    fn compose(&mut self, left: EyeImage, right: EyeImage, display: DisplaySize) {
        self.frames += 1;
        if self.frames % 60 == 0 {
            let (half_width, height) = (display.width / 2, display.height);
            debug!(
                frames = self.frames,
                half_width,
                height,
                left = ?left.eye,
                right = ?right.eye,
                "Composed side-by-side frame"
            );
        }
        self.last = Some((left, right));
    }
}

/// Slow look-around with a gentle nod, as seen by a head-mounted IMU.
fn synthetic_sample(t: f32) -> RawImuSample {
    let nod = 0.3 * (t * 1.5).sin();
    let tilt = 0.1 * (t * 0.7).sin();
    RawImuSample::new(
        Vec3::new(0.4 * (t * 0.5).cos(), 0.45 * (t * 1.5).cos(), 0.07 * (t * 0.7).cos()),
        Vec3::new(
            GRAVITY * nod.cos() * tilt.cos(),
            GRAVITY * tilt.sin(),
            GRAVITY * nod.sin(),
        ),
    )
}

fn build_camera(config: &AppConfig) -> StereoCamera {
    let camera_config = &config.camera;
    let mut camera = StereoCamera::new(
        camera_config.field_of_view,
        camera_config.near,
        camera_config.far,
        camera_config.eye_distance,
        camera_config.viewport_width,
        camera_config.viewport_height,
        DisplaySize::new(config.display.width, config.display.height),
    );
    camera.set_to_translation(camera_config.position);
    camera
}

fn build_fusion(config: &AppConfig, camera: &mut StereoCamera) -> SensorFusionAdapter {
    let fusion_config = &config.fusion;
    let mut fusion = SensorFusionAdapter::new();
    fusion.set_smoothing_window(fusion_config.window());
    fusion.set_factor_yaw(fusion_config.factor_yaw);
    fusion.set_factor_pitch(fusion_config.factor_pitch);
    fusion.set_factor_roll(fusion_config.factor_roll);
    fusion.set_logging(fusion_config.logging);

    if fusion_config.calib_yaw != 0.0 {
        fusion.set_calib_yaw(camera, fusion_config.calib_yaw);
    }
    if fusion_config.calib_pitch != 0.0 {
        fusion.set_calib_pitch(camera, fusion_config.calib_pitch);
    }
    if fusion_config.calib_roll != 0.0 {
        fusion.set_calib_roll(camera, fusion_config.calib_roll);
    }
    fusion
}

fn main() -> Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vrcam_app=info,vrcam_imu=info,vrcam_renderer=info".into()),
        )
        .init();

    info!("Stereo head tracking demo starting");

    let config = vrcam_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    info!(
        fov = config.camera.field_of_view,
        eye_distance = config.camera.eye_distance,
        window = config.fusion.window(),
        "Config loaded"
    );

    let mut camera = build_camera(&config);
    let mut fusion = build_fusion(&config, &mut camera);

    // Re-center on the first reading, the way a user would at startup.
    fusion.calibrate(&mut camera, synthetic_sample(0.0).accel);

    let mut renderer = TraceRenderer;
    let mut compositor = MemoryCompositor::default();

    for frame in 0..FRAME_COUNT {
        let t = frame as f32 * FRAME_DT;
        fusion.update(&mut camera, FRAME_DT, &synthetic_sample(t));
        camera.update();

        if let Err(never) = camera.render(&mut renderer, &mut compositor) {
            match never {}
        }
    }

    info!(
        frames = compositor.frames,
        yaw = camera.yaw_degrees(),
        pitch = camera.pitch_degrees(),
        roll = camera.roll_degrees(),
        direction = ?camera.direction(),
        up = ?camera.up(),
        left_eye = ?camera.left_position(),
        right_eye = ?camera.right_position(),
        "Demo finished"
    );

    if let Some((left, right)) = compositor.last {
        let center = Vec3::ZERO;
        info!(
            left_clip = ?left.combined.project_point3(center),
            right_clip = ?right.combined.project_point3(center),
            "Origin as seen by each eye"
        );
    }

    Ok(())
}

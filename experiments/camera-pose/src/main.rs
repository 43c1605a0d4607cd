use camera_pose::{Display, DisplayError, PoseSession, SessionConfig, SessionHandle, Surface};
use deli_base::{init_logger, init_stdout_logger, log_fatal};
use deli_camera::V4l2Camera;
use deli_infer::OnnxPoseAdapter;
use minifb::{Key, Window, WindowOptions};

const WIDTH: usize = 640;
const HEIGHT: usize = 480;

struct WindowDisplay {
    window: Window,
    buffer: Vec<u32>,
}

impl WindowDisplay {
    fn open() -> Result<Self, DisplayError> {
        let options = WindowOptions {
            resize: true,
            ..WindowOptions::default()
        };
        let window = Window::new("Camera Pose - ESC to exit", WIDTH, HEIGHT, options)
            .map_err(|e| DisplayError(e.to_string()))?;
        Ok(Self {
            window,
            buffer: Vec::new(),
        })
    }
}

impl Display for WindowDisplay {
    fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    fn pump(&mut self) {
        self.window.update();
    }

    fn present(&mut self, surface: &Surface) -> Result<(), DisplayError> {
        self.buffer = surface.to_u32();
        self.window
            .update_with_buffer(&self.buffer, surface.width(), surface.height())
            .map_err(|e| DisplayError(e.to_string()))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match SessionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_stdout_logger();
            log_fatal!("{}", e);
        }
    };
    init_logger(config.log_dir().cloned())?;

    log::info!("camera {}", config.camera().device());
    log::info!("model {}", config.capability().model());

    let display = match WindowDisplay::open() {
        Ok(display) => display,
        Err(e) => log_fatal!("{}", e),
    };

    let handle = SessionHandle::new();
    let session = match PoseSession::launch(
        &config,
        handle,
        V4l2Camera::new,
        OnnxPoseAdapter::initialize,
        display,
    )
    .await
    {
        Ok(session) => session,
        Err(e) => log_fatal!("{}", e),
    };

    session.run().await;
    Ok(())
}

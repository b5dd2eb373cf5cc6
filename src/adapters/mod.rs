//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                  |
//! |----------------|--------------------|------------------------------|
//! | `config_file`  | ConfigPort         | JSON file on disk            |
//! | `detector`     | Detector           | External detector process    |
//! | `frame_source` | FrameSource        | Capture tool snapshot files  |
//! | `log_sink`     | EventSink          | `log` facade                 |
//! | `tcp_channel`  | CommandChannel     | ESP32 motor controller (TCP) |
//! | `tesseract`    | TextRecognizer     | Tesseract OCR process        |
//! | `time`         | Clock              | OS monotonic / virtual clock |

pub mod config_file;
pub mod detector;
pub mod frame_source;
pub mod log_sink;
pub mod tcp_channel;
pub mod tesseract;
pub mod time;

// This is free and unencumbered software released into the public domain.

mod bridge;
pub use bridge::*;

mod channel;
pub use channel::*;

mod command;
pub use command::*;

mod config;
pub use config::*;

pub mod drivers {
    pub mod loopback;
}

mod error;
pub use error::*;

mod executor;
pub use executor::*;

mod listener;
pub use listener::{Barcode, CameraEventListener, PictureRequest};

mod permission;
pub use permission::*;

mod result;
pub use result::*;

mod value;
pub use value::*;

mod view;
pub use view::*;

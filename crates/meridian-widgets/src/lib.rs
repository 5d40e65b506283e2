//! Behaviour of the site's page widgets, independent of any browser binding.
//!
//! Each widget is modelled as plain state plus the service traits it talks
//! to. The host page supplies concrete [`EmailSender`], [`ChatWidget`] and
//! [`FormView`] implementations.

pub mod carousel;
pub mod chart;
pub mod contact;
pub mod counter;
pub mod scroll;

pub use carousel::{Slider, SwiperPair};
pub use chart::{ChartTrigger, DoughnutChart};
pub use contact::{
    Ack, ChatCommand, ChatWidget, ContactController, ContactForm, EmailSender, EmailTemplate,
    FormFeedback, FormView, SendError, Tone,
};
pub use counter::CounterAnimation;
pub use scroll::ScrollState;

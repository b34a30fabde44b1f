//! Pre-built UI components for tui-relay
//!
//! Interactive components take an [`ActionHandle`](tui_relay_core::ActionHandle)
//! in their props. On activation they mark the event for bubbling, then
//! dispatch; while the action is in flight they show a spinner and refuse
//! input.
//!
//! # Components
//!
//! - [`Button`] - Clickable button with a fixed payload
//! - [`Breadcrumbs`] - Trail of crumbs, some clickable
//! - [`Header`] - Title, breadcrumbs and action items
//! - [`Label`] - Editable text submitted as a `String` payload
//! - [`Center`] / [`CenterLayout`] - Centered box and header-over-body page
//! - [`Ripple`] - Expanding rings at the point a descendant was activated
//!
//! # Example
//!
//! ```ignore
//! use tui_relay_components::{Button, ButtonProps, ColorName};
//!
//! let save = dispatcher.bind(Some(&keys.save));
//! let mut button = Button::new(ElementId(1));
//! button.render(frame, area, ButtonProps {
//!     label: "Save",
//!     color: ColorName::Blue,
//!     icon: None,
//!     action: &save,
//!     payload: &(),
//!     is_focused: true,
//!     activation: &activation,
//! });
//! ```

mod breadcrumbs;
mod button;
mod center;
mod color;
mod description;
mod header;
mod label;
mod ripple;
mod watch;

pub use breadcrumbs::{Breadcrumbs, BreadcrumbsProps, Crumb};
pub use button::{Button, ButtonProps};
pub use center::{centered_rect, Center, CenterAreas, CenterLayout};
pub use color::{control_style, get_color, ColorName, ControlState, Icon, Shade, SPINNER_FRAMES};
pub use description::{
    ButtonDescription, CrumbDescription, HeaderDescription, LabelDescription, PageDescription,
};
pub use header::{Header, HeaderItem, HeaderProps};
pub use label::{Label, LabelProps, LineEditor};
pub use ripple::{Ripple, RippleProps};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        centered_rect, get_color, Breadcrumbs, BreadcrumbsProps, Button, ButtonProps, Center,
        CenterLayout, ColorName, Crumb, Header, HeaderItem, HeaderProps, Icon, Label, LabelProps,
        PageDescription, Ripple, RippleProps,
    };
}

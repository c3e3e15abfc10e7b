// led-marquee host library
// Display model, marquee controller and the HTTP control surface

// Display model
pub mod clock;
pub mod display;
pub mod font;
pub mod layout;
pub mod life;
pub mod scroller;

// Message cycle
pub mod marquee;

// Device control over MQTT
pub mod mqtt;

// Configuration
pub mod config;
pub mod user_config;

// HTTP surface
pub mod api;
pub mod form;
pub mod panel;

// Embedded control panel (single-binary distribution)
pub mod embedded;

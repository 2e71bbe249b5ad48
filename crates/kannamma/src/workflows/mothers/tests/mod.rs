mod common;
mod routing;
mod views;

mod common;
mod decisions;
mod routing;

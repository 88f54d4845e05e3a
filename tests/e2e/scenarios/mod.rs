mod async_cases;
mod properties;
mod sequencing;

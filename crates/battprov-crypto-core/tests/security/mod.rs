mod entropy_quality;
mod kek_separation;

//! Describe command - reverse geocode the current position.

use whereami::geocoder::Placemark;
use whereami::location::PlaceResponse;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the describe command.
pub async fn run(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("describe");
    let session = runner.create_session()?;

    match session.describe_place().await {
        PlaceResponse::Found(place) => print!("{}", render(&place)),
        PlaceResponse::NotFound => println!("No place found at the current position"),
        PlaceResponse::Failure(e) => return Err(CliError::Place(e)),
        PlaceResponse::Unauthorized => return Err(CliError::Unauthorized),
    }

    Ok(())
}

/// One summary line followed by the known address details.
fn render(place: &Placemark) -> String {
    let mut out = format!("{}\n", place);

    let details = [
        ("Street", place.street_address()),
        ("Postal code", place.postal_code.clone()),
        ("Locality", place.locality.clone()),
        ("Region", place.administrative_area.clone()),
        ("Country", place.country.clone()),
        ("Country code", place.iso_country_code.clone()),
    ];

    for (label, value) in details {
        if let Some(value) = value {
            out.push_str(&format!("  {:<13} {}\n", format!("{}:", label), value));
        }
    }

    out.push_str(&format!("  {:<13} {}\n", "Coordinate:", place.coordinate));
    out
}

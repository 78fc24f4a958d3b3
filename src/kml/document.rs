use geo::{LineString, Polygon};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::KmlError;
use super::style::{PolygonStyle, STYLE_ID};

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    pub name: String,
    pub polygon: Polygon<f64>,
}

impl Placemark {
    pub fn new(name: impl Into<String>, polygon: Polygon<f64>) -> Self {
        Self {
            name: name.into(),
            polygon,
        }
    }
}

type XmlWriter = Writer<Vec<u8>>;

fn start(w: &mut XmlWriter, tag: &str) -> Result<(), KmlError> {
    w.write_event(Event::Start(BytesStart::new(tag)))?;
    Ok(())
}

fn end(w: &mut XmlWriter, tag: &str) -> Result<(), KmlError> {
    w.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn text_element(w: &mut XmlWriter, tag: &str, text: &str) -> Result<(), KmlError> {
    start(w, tag)?;
    w.write_event(Event::Text(BytesText::new(text)))?;
    end(w, tag)
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

// KML wants lon,lat,alt tuples separated by whitespace.
fn coordinates(ring: &LineString<f64>) -> String {
    ring.coords()
        .map(|c| format!("{},{},0", c.x, c.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_ring(w: &mut XmlWriter, boundary: &str, ring: &LineString<f64>) -> Result<(), KmlError> {
    start(w, boundary)?;
    start(w, "LinearRing")?;
    text_element(w, "coordinates", &coordinates(ring))?;
    end(w, "LinearRing")?;
    end(w, boundary)
}

fn write_style(w: &mut XmlWriter, style: &PolygonStyle) -> Result<(), KmlError> {
    w.write_event(Event::Start(
        BytesStart::new("Style").with_attributes([("id", STYLE_ID)]),
    ))?;
    start(w, "PolyStyle")?;
    text_element(w, "color", &style.color)?;
    text_element(w, "fill", flag(style.fill))?;
    text_element(w, "outline", flag(style.outline))?;
    end(w, "PolyStyle")?;
    end(w, "Style")
}

fn write_placemark(w: &mut XmlWriter, placemark: &Placemark) -> Result<(), KmlError> {
    start(w, "Placemark")?;
    text_element(w, "name", &placemark.name)?;
    text_element(w, "styleUrl", &format!("#{}", STYLE_ID))?;
    start(w, "Polygon")?;
    write_ring(w, "outerBoundaryIs", placemark.polygon.exterior())?;
    for interior in placemark.polygon.interiors() {
        write_ring(w, "innerBoundaryIs", interior)?;
    }
    end(w, "Polygon")?;
    end(w, "Placemark")
}

/// Renders a KML document with a single folder named `name`.
pub fn render_kml(
    name: &str,
    placemarks: &[Placemark],
    style: &PolygonStyle,
) -> Result<Vec<u8>, KmlError> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);

    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    w.write_event(Event::Start(
        BytesStart::new("kml").with_attributes([("xmlns", KML_NAMESPACE)]),
    ))?;
    start(&mut w, "Document")?;
    write_style(&mut w, style)?;

    start(&mut w, "Folder")?;
    text_element(&mut w, "name", name)?;
    for placemark in placemarks {
        write_placemark(&mut w, placemark)?;
    }
    end(&mut w, "Folder")?;

    end(&mut w, "Document")?;
    end(&mut w, "kml")?;

    Ok(w.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extent::Extent;
    use geo::polygon;

    fn render(name: &str, placemarks: &[Placemark]) -> String {
        let bytes = render_kml(name, placemarks, &PolygonStyle::default()).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_placemark_coordinates_are_lon_lat_alt() {
        let extent = Extent {
            xmin: 10.0,
            ymin: 48.0,
            xmax: 12.0,
            ymax: 50.0,
        };
        let kml = render("Test", &[Placemark::new("Subgrid 1", extent.to_polygon())]);

        assert!(kml.contains("<coordinates>10,48,0 10,50,0 12,50,0 12,48,0 10,48,0</coordinates>"));
        assert!(kml.contains("<name>Subgrid 1</name>"));
        assert!(kml.contains("<styleUrl>#coverage</styleUrl>"));
        assert!(!kml.contains("innerBoundaryIs"));
    }

    #[test]
    fn test_folder_and_style() {
        let kml = render("ntv2_0 Coverage", &[]);

        assert!(kml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(kml.contains("<kml xmlns=\"http://www.opengis.net/kml/2.2\">"));
        assert!(kml.contains("<Folder>"));
        assert!(kml.contains("<name>ntv2_0 Coverage</name>"));
        assert!(kml.contains("<Style id=\"coverage\">"));
        assert!(kml.contains("<color>7d00ff00</color>"));
        assert!(kml.contains("<fill>1</fill>"));
        assert!(kml.contains("<outline>1</outline>"));
        assert_eq!(kml.matches("<Placemark>").count(), 0);
    }

    #[test]
    fn test_names_are_escaped() {
        let kml = render("A & B <grids>", &[]);
        assert!(kml.contains("<name>A &amp; B &lt;grids&gt;</name>"));
    }

    #[test]
    fn test_interior_rings_are_written() {
        let with_hole = polygon!(
            exterior: [
                (x: 0.0, y: 0.0),
                (x: 3.0, y: 0.0),
                (x: 3.0, y: 3.0),
                (x: 0.0, y: 3.0),
                (x: 0.0, y: 0.0),
            ],
            interiors: [[
                (x: 1.0, y: 1.0),
                (x: 2.0, y: 1.0),
                (x: 2.0, y: 2.0),
                (x: 1.0, y: 2.0),
                (x: 1.0, y: 1.0),
            ]],
        );
        let kml = render("Ring", &[Placemark::new("Merged", with_hole)]);

        assert_eq!(kml.matches("<outerBoundaryIs>").count(), 1);
        assert_eq!(kml.matches("<innerBoundaryIs>").count(), 1);
    }
}

//! Layout of parsed sketch statements
//!
//! Boxes are measured first and then placed on a grid; packages lay out
//! their own statements on a nested canvas. Connections are drawn on the
//! root canvas once every classifier has a position.

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};
use unicode_width::UnicodeWidthStr;

use crate::core::{
    Bounds, Diagnostic, ElementType, LayoutElement, LayoutedDiagram, Line, MarkerSide, Point,
    PointDefinition, RenderConfig,
};

use super::parser::{ClassifierDecl, ConnectionDecl, PackageDecl, Statement};

/// Average glyph width relative to the font size
const GLYPH_WIDTH: f64 = 0.6;

/// Id and bounds of a placed classifier or package
#[derive(Debug, Clone)]
struct Placed {
    id: String,
    bounds: Bounds,
}

/// Builds a [`LayoutedDiagram`] from parsed statements
pub struct SketchLayout<'c> {
    config: &'c RenderConfig,
    points: BTreeMap<String, PointDefinition>,
    lines: BTreeMap<String, Line>,
    /// Classifiers and packages by name, the targets connections may name
    endpoints: HashMap<String, Placed>,
    connections: Vec<ConnectionDecl>,
    errors: Vec<Diagnostic>,
    next_id: usize,
}

impl<'c> SketchLayout<'c> {
    pub fn new(config: &'c RenderConfig) -> Self {
        Self {
            config,
            points: BTreeMap::new(),
            lines: BTreeMap::new(),
            endpoints: HashMap::new(),
            connections: Vec::new(),
            errors: Vec::new(),
            next_id: 0,
        }
    }

    /// Lay out a whole diagram
    ///
    /// Returns the diagram together with interpreter diagnostics, such as
    /// connections naming neither a classifier nor a package.
    pub fn run(mut self, statements: &[Statement]) -> (LayoutedDiagram, Vec<Diagnostic>) {
        let (width, height) = self.measure_canvas(statements);
        let mut children = self.place_canvas(statements, Point::default());

        for connection in std::mem::take(&mut self.connections) {
            children.extend(self.connection(&connection));
        }

        let root = LayoutElement::new("root", ElementType::Canvas)
            .with_class([self.config.theme.class_tag()])
            .with_children(children)
            .with_bounds(Bounds::new(0.0, 0.0, width, height));

        debug!(
            endpoints = self.endpoints.len(),
            points = self.points.len(),
            lines = self.lines.len(),
            "Sketch layout finished"
        );

        let diagram = LayoutedDiagram {
            root,
            points: self.points,
            lines: self.lines,
        };
        (diagram, self.errors)
    }

    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn text_width(&self, text: &str) -> f64 {
        text.width() as f64 * GLYPH_WIDTH * self.config.font_size
    }

    /// Size of a box holding `lines` stacked text lines
    fn text_box_size<'a>(&self, lines: impl IntoIterator<Item = &'a str>) -> (f64, f64) {
        let (width, count) = lines
            .into_iter()
            .fold((0.0_f64, 0usize), |(width, count), line| {
                (width.max(self.text_width(line)), count + 1)
            });
        (
            width + 2.0 * self.config.padding,
            count as f64 * self.config.line_height() + 2.0 * self.config.padding,
        )
    }

    fn measure(&self, statement: &Statement) -> Option<(f64, f64)> {
        match statement {
            Statement::Classifier(decl) => {
                let lines = classifier_lines(decl);
                Some(self.text_box_size(lines.iter().map(String::as_str)))
            }
            Statement::Comment(text) => Some(self.text_box_size(text.split('\n'))),
            Statement::Package(package) => {
                let (content_width, content_height) = self.measure_canvas(&package.statements);
                let padding = self.config.padding;
                Some((
                    content_width.max(self.text_width(&package.name)) + 2.0 * padding,
                    self.config.line_height() + content_height + 3.0 * padding,
                ))
            }
            Statement::Connection(_) => None,
        }
    }

    /// Extent of the grid holding the boxes of `statements`
    fn measure_canvas(&self, statements: &[Statement]) -> (f64, f64) {
        let sizes: Vec<(f64, f64)> = statements.iter().filter_map(|s| self.measure(s)).collect();
        let spacing = self.config.spacing;

        sizes
            .chunks(self.config.columns.max(1))
            .enumerate()
            .fold((0.0_f64, 0.0_f64), |(width, height), (row, items)| {
                let row_width = items.iter().map(|(w, _)| w).sum::<f64>()
                    + spacing * (items.len() - 1) as f64;
                let row_height = items.iter().map(|(_, h)| *h).fold(0.0, f64::max);
                let gap = if row == 0 { 0.0 } else { spacing };
                (width.max(row_width), height + gap + row_height)
            })
    }

    /// Place the boxes of `statements` on a grid starting at `origin`
    fn place_canvas(&mut self, statements: &[Statement], origin: Point) -> Vec<LayoutElement> {
        let columns = self.config.columns.max(1);
        let spacing = self.config.spacing;
        let mut elements = Vec::new();
        let mut cursor = origin;
        let mut row_height: f64 = 0.0;
        let mut column = 0;

        for statement in statements {
            let Some((width, height)) = self.measure(statement) else {
                if let Statement::Connection(connection) = statement {
                    self.connections.push(connection.clone());
                }
                continue;
            };

            if column == columns {
                cursor = Point::new(origin.x, cursor.y + row_height + spacing);
                row_height = 0.0;
                column = 0;
            }

            let bounds = Bounds::new(cursor.x, cursor.y, width, height);
            let element = match statement {
                Statement::Classifier(decl) => self.classifier(decl, bounds),
                Statement::Comment(text) => self.comment(text, bounds),
                Statement::Package(package) => self.package(package, bounds),
                Statement::Connection(_) => continue,
            };
            elements.push(element);

            cursor.x += width + spacing;
            row_height = row_height.max(height);
            column += 1;
        }
        elements
    }

    /// Canvas element anchored at the top-left corner of `bounds`
    fn canvas_element(&mut self, prefix: &str, tags: Vec<&str>, bounds: Bounds) -> LayoutElement {
        let id = self.fresh_id(prefix);
        let pos = format!("{}-pos", id);
        self.points.insert(
            pos.clone(),
            PointDefinition::Absolute {
                x: bounds.x,
                y: bounds.y,
            },
        );
        let mut element = LayoutElement::new(id, ElementType::CanvasElement)
            .with_class(tags)
            .with_bounds(bounds);
        element.pos = Some(pos);
        element
    }

    /// Text element with a single span
    fn text(&mut self, tags: &[&str], content: &str, at: Point) -> LayoutElement {
        let id = self.fresh_id("text");
        let bounds = Bounds::new(at.x, at.y, self.text_width(content), self.config.line_height());
        LayoutElement::new(id.clone(), ElementType::Text)
            .with_class(tags.iter().copied())
            .with_child(LayoutElement::span(format!("{}-span", id), content))
            .with_bounds(bounds)
    }

    /// Frame and column wrapping the content of a box
    fn frame(&mut self, bounds: Bounds, content: Vec<LayoutElement>) -> LayoutElement {
        let rect_id = self.fresh_id("rect");
        let vbox_id = self.fresh_id("vbox");
        LayoutElement::new(rect_id, ElementType::Rect)
            .with_bounds(bounds)
            .with_child(
                LayoutElement::new(vbox_id, ElementType::Vbox)
                    .with_children(content)
                    .with_bounds(bounds),
            )
    }

    fn classifier(&mut self, decl: &ClassifierDecl, bounds: Bounds) -> LayoutElement {
        let mut tags = vec![decl.kind.element_class()];
        if decl.is_abstract {
            tags.push("abstract");
        }
        let element = self.canvas_element(&decl.kind.to_string(), tags, bounds);
        trace!(id = %element.id, name = %decl.name, "Placed classifier");

        let padding = self.config.padding;
        let line_height = self.config.line_height();
        let mut cursor = Point::new(bounds.x + padding, bounds.y + padding);
        let mut content = Vec::new();

        if let Some(stereotype) = decl.kind.stereotype() {
            content.push(self.text(&["keyword"], stereotype, cursor));
            cursor.y += line_height;
        }
        content.push(self.text(&["title"], &decl.name, cursor));
        cursor.y += line_height;

        for section in &decl.sections {
            for member in &section.members {
                let hbox_id = self.fresh_id("hbox");
                let mut row = LayoutElement::new(hbox_id, ElementType::Hbox);
                let mut text_at = cursor;
                if let Some(visibility) = section.visibility {
                    let glyph = format!("{} ", visibility.symbol());
                    row = row.with_child(self.text(&["keyword"], &glyph, cursor));
                    text_at.x += self.text_width(&glyph);
                }
                row = row.with_child(self.text(&[], member, text_at));
                content.push(row);
                cursor.y += line_height;
            }
        }

        let frame = self.frame(bounds, content);
        self.endpoints.insert(
            decl.name.clone(),
            Placed {
                id: element.id.clone(),
                bounds,
            },
        );
        element.with_child(frame)
    }

    fn comment(&mut self, text: &str, bounds: Bounds) -> LayoutElement {
        let element = self.canvas_element("comment", vec!["comment-element"], bounds);
        let padding = self.config.padding;
        let line_height = self.config.line_height();

        let content = text
            .split('\n')
            .enumerate()
            .map(|(index, line)| {
                let at = Point::new(
                    bounds.x + padding,
                    bounds.y + padding + index as f64 * line_height,
                );
                self.text(&[], line, at)
            })
            .collect();
        let frame = self.frame(bounds, content);
        element.with_child(frame)
    }

    fn package(&mut self, package: &PackageDecl, bounds: Bounds) -> LayoutElement {
        let element = self.canvas_element("package", vec!["package-element"], bounds);
        let padding = self.config.padding;
        let line_height = self.config.line_height();

        let title = self.text(
            &["title"],
            &package.name,
            Point::new(bounds.x + padding, bounds.y + padding),
        );
        let origin = Point::new(bounds.x + padding, bounds.y + 2.0 * padding + line_height);
        let (content_width, content_height) = self.measure_canvas(&package.statements);
        let canvas_id = self.fresh_id("canvas");
        let canvas = LayoutElement::new(canvas_id, ElementType::Canvas)
            .with_children(self.place_canvas(&package.statements, origin))
            .with_bounds(Bounds::new(origin.x, origin.y, content_width, content_height));

        let frame = self.frame(bounds, vec![title, canvas]);
        self.endpoints.insert(
            package.name.clone(),
            Placed {
                id: element.id.clone(),
                bounds,
            },
        );
        element.with_child(frame)
    }

    /// Connection element followed by its label elements
    fn connection(&mut self, decl: &ConnectionDecl) -> Vec<LayoutElement> {
        let (Some(from), Some(to)) = (self.resolve(&decl.from), self.resolve(&decl.to)) else {
            return Vec::new();
        };

        let reversed = decl.operator.is_reversed();
        let (from, to) = if reversed { (to, from) } else { (from, to) };

        let id = self.fresh_id("connection");
        let start = format!("{}-start", id);
        let end = format!("{}-end", id);
        self.points.insert(start.clone(), anchor(&from.id, 0.0, None));
        self.points.insert(end.clone(), anchor(&to.id, 0.0, None));

        let line = if from.id == to.id {
            self_loop(from.bounds, self.config.spacing)
        } else {
            route(from.bounds, to.bounds)
        };

        let mut tags = vec!["connection"];
        if decl.operator.is_dashed() {
            tags.push("dashed-connection");
        }
        let mut element = LayoutElement::new(id.clone(), ElementType::CanvasConnection)
            .with_class(tags)
            .with_child(LayoutElement::new(format!("{}-path", id), ElementType::Path));
        element.start = Some(start);
        element.end = Some(end);

        if let Some(marker_class) = decl.operator.marker_class() {
            let mut marker = LayoutElement::new(format!("{}-marker", id), ElementType::Marker)
                .with_class([marker_class]);
            marker.marker = Some(MarkerSide::End);
            element = element.with_child(marker);
        }

        let mut elements = vec![element];
        for label in &decl.labels {
            let t = label.position.clamp(0.0, 1.0);
            let t = if reversed { 1.0 - t } else { t };
            let (segment, fraction) = line.locate(t);
            let at = line.point_at(t);

            let label_id = self.fresh_id("label");
            let pos = format!("{}-pos", label_id);
            self.points.insert(pos.clone(), anchor(&id, fraction, Some(segment)));

            let width = self.text_width(&label.text);
            let height = self.config.line_height();
            let text = self.text(&[], &label.text, Point::new(at.x, at.y - height));
            let mut label_element = LayoutElement::new(label_id, ElementType::CanvasElement)
                .with_class(["label"])
                .with_child(text)
                .with_bounds(Bounds::new(at.x, at.y - height, width, height));
            label_element.pos = Some(pos);
            elements.push(label_element);
        }

        self.lines.insert(id, line);
        elements
    }

    fn resolve(&mut self, name: &str) -> Option<Placed> {
        let placed = self.endpoints.get(name).cloned();
        if placed.is_none() {
            debug!(name, "Connection names an unknown element");
            self.errors
                .push(Diagnostic::new(format!("Unknown identifier '{}'", name)));
        }
        placed
    }
}

/// Text lines drawn inside a classifier box
fn classifier_lines(decl: &ClassifierDecl) -> Vec<String> {
    let mut lines: Vec<String> = decl.kind.stereotype().map(String::from).into_iter().collect();
    lines.push(decl.name.clone());
    for section in &decl.sections {
        for member in &section.members {
            match section.visibility {
                Some(visibility) => lines.push(format!("{} {}", visibility.symbol(), member)),
                None => lines.push(member.clone()),
            }
        }
    }
    lines
}

fn anchor(provider: &str, pos: f64, segment: Option<usize>) -> PointDefinition {
    PointDefinition::LinePoint {
        line_provider: provider.to_string(),
        pos,
        segment,
        distance: 0.0,
    }
}

/// Three axis-aligned segments between the centres of two boxes
fn route(from: Bounds, to: Bounds) -> Line {
    let a = from.center();
    let b = to.center();
    if (b.x - a.x).abs() >= (b.y - a.y).abs() {
        let mid_x = (a.x + b.x) / 2.0;
        Line::through(&[a, Point::new(mid_x, a.y), Point::new(mid_x, b.y), b])
    } else {
        let mid_y = (a.y + b.y) / 2.0;
        Line::through(&[a, Point::new(a.x, mid_y), Point::new(b.x, mid_y), b])
    }
}

/// Loop leaving and re-entering the right side of a box
fn self_loop(bounds: Bounds, spacing: f64) -> Line {
    let center = bounds.center();
    let outside = bounds.right() + spacing / 2.0;
    let upper = center.y - bounds.height / 4.0;
    let lower = center.y + bounds.height / 4.0;
    Line::through(&[
        Point::new(bounds.right(), upper),
        Point::new(outside, upper),
        Point::new(outside, lower),
        Point::new(bounds.right(), lower),
    ])
}

use crate::{element::Handle, error::Error, mesh::TriMesh};
use glam::DVec3;
use std::{
    fs::File,
    io::{BufRead, BufWriter, Write},
    path::Path,
};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: false,
        triangulate: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Concatenate the models into one mesh. Indices of every model are local to
/// that model, so they are offset by the number of vertices before it.
fn mesh_from_models(models: Vec<tobj::Model>) -> Result<TriMesh, Error> {
    let (nverts, nindices) = models
        .iter()
        .fold((0usize, 0usize), |(nverts, nindices), model| {
            (
                nverts + model.mesh.positions.len() / 3,
                nindices + model.mesh.indices.len(),
            )
        });
    let mut points = Vec::with_capacity(nverts);
    let mut triangles: Vec<[u32; 3]> = Vec::with_capacity(nindices / 3);
    for model in models {
        let mesh = model.mesh;
        if mesh.positions.len() % 3 != 0 {
            return Err(Error::IncorrectNumberOfCoordinates(mesh.positions.len()));
        }
        let voffset = points.len() as u32;
        points.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|c| DVec3::new(c[0], c[1], c[2])),
        );
        // Arities are only recorded when the model has non-triangle faces.
        if let Some((face, &arity)) = mesh
            .face_arities
            .iter()
            .enumerate()
            .find(|(_, arity)| **arity != 3)
        {
            return Err(Error::NonTriangleFace {
                face: triangles.len() + face,
                arity: arity as usize,
            });
        }
        if mesh.indices.len() % 3 != 0 {
            return Err(Error::NonTriangleFace {
                face: triangles.len() + mesh.indices.len() / 3,
                arity: mesh.indices.len() % 3,
            });
        }
        triangles.extend(
            mesh.indices
                .chunks_exact(3)
                .map(|t| [t[0] + voffset, t[1] + voffset, t[2] + voffset]),
        );
    }
    if triangles.is_empty() {
        return Err(Error::EmptyMesh);
    }
    TriMesh::from_triangles(points, &triangles)
}

impl TriMesh {
    /// Load a triangle mesh from a Wavefront OBJ file. Only vertex positions
    /// and faces are read, and every face must be a triangle.
    pub fn load_obj(path: &Path) -> Result<Self, Error> {
        let (models, _) = tobj::load_obj(path, &load_options()).map_err(|e| match e {
            tobj::LoadError::OpenFileFailed => Error::InvalidObjFile(path.to_path_buf()),
            e => Error::ObjLoadFailed(format!("{}", e)),
        })?;
        mesh_from_models(models)
    }

    /// Read a triangle mesh in OBJ format from a buffer. Material libraries
    /// referenced by the data are not loaded.
    pub fn read_obj(reader: &mut impl BufRead) -> Result<Self, Error> {
        let (models, _) = tobj::load_obj_buf(reader, &load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        mesh_from_models(models)
    }

    /// Write the live vertices and faces in OBJ format. Vertices are
    /// renumbered in handle order, skipping deleted ones.
    pub fn write_obj(&self, writer: &mut impl Write) -> Result<(), Error> {
        let mut vmap = vec![0u32; self.num_vertices()];
        for (i, v) in self.live_vertices().enumerate() {
            // OBJ indices are 1-based.
            vmap[v.index() as usize] = i as u32 + 1;
            let p = self.point(v);
            writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
        }
        for f in self.live_faces() {
            let [a, b, c] = self.face_vertices(f).map(|v| vmap[v.index() as usize]);
            writeln!(writer, "f {} {} {}", a, b, c)?;
        }
        Ok(())
    }

    pub fn save_obj(&self, path: &Path) -> Result<(), Error> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_obj(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

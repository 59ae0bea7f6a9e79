/// Dense row-major matrix of encoded features with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>
}

impl FeatureMatrix {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self {
            columns,
            rows
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Copies one column out of the matrix. `None` when the column is
    /// unknown or some row is too short to hold it.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let index = self.column_index(name)?;
        self.rows.iter().map(|row| row.get(index).copied()).collect()
    }

    /// Builds a new matrix from a subset of rows, in the given order.
    ///
    /// # Panics
    /// Panics if an index is out of range; the caller's labels would no
    /// longer line up with the selected rows.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&index| self.rows[index].clone()).collect()
        }
    }
}
